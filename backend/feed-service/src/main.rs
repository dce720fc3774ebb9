use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use feed_service::models::FeedEntry;
use feed_service::{Config, Dataset, FeedContext, SearchOutcome, SearchQuery, SnapshotStore};
use std::io::{self, BufRead, Write};
use std::time::Instant;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const PROMPT: &str = ">> ";
const QUIT: &str = ":q";

fn main() -> Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;

    // Logs go to stderr so they never interleave with the feed on stdout
    let json_layer = config.log_json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_writer(io::stderr)
    });
    let text_layer =
        (!config.log_json).then(|| tracing_subscriber::fmt::layer().with_writer(io::stderr));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "feed_service=info".into()),
        )
        .with(json_layer)
        .with(text_layer)
        .init();

    info!("Starting feed-service v{}", env!("CARGO_PKG_VERSION"));

    let store = SnapshotStore::from_config(&config);
    if config.rebuild_cache {
        store
            .invalidate()
            .context("Failed to invalidate snapshot cache")?;
    }

    let started = Instant::now();
    let dataset = Dataset::load_from_directory(&config.dataset_dir)
        .with_context(|| format!("Failed to load dataset from {}", config.dataset_dir.display()))?;
    info!(elapsed_ms = started.elapsed().as_millis() as u64, "Dataset loaded");

    let started = Instant::now();
    let mut context = FeedContext::load_or_build(&store, dataset, now())
        .context("Failed to prepare affinity graph and search trie")?;
    info!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        statuses = context.corpus.len(),
        "Feed context ready"
    );

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    println!("Enter your username:");
    let Some(username) = prompt(&mut lines)? else {
        return Ok(());
    };
    let username = username.trim().to_string();

    print_feed(&context.feed(&username, now()));

    loop {
        println!();
        println!("Search (term, \"exact phrase\", prefix* or {} to quit):", QUIT);
        let Some(input) = prompt(&mut lines)? else {
            break;
        };
        if input.trim() == QUIT {
            break;
        }

        match context.search(&username, &SearchQuery::parse(&input), now()) {
            SearchOutcome::Nothing => {}
            SearchOutcome::Suggestions(words) if words.is_empty() => {
                println!("No completions found");
            }
            SearchOutcome::Suggestions(words) => {
                for word in words {
                    println!("{}", word);
                }
            }
            SearchOutcome::Feed(entries) if entries.is_empty() => {
                println!("No statuses found");
            }
            SearchOutcome::Feed(entries) => print_feed(&entries),
        }
    }

    info!("Shutting down feed-service");
    Ok(())
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Print the prompt and read one line. `None` on end of input.
fn prompt<I>(lines: &mut I) -> Result<Option<String>>
where
    I: Iterator<Item = io::Result<String>>,
{
    print!("{}", PROMPT);
    io::stdout().flush()?;

    match lines.next() {
        Some(line) => Ok(Some(line?)),
        None => Ok(None),
    }
}

fn print_feed(entries: &[FeedEntry]) {
    for entry in entries {
        println!("{}", entry);
        println!();
    }
}
