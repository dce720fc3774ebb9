//! Integration Tests: dataset → affinity graph + search trie → ranked feed
//!
//! Coverage:
//! - Dataset directory loading feeds the graph and the trie
//! - Friend statuses outrank interaction-only authors
//! - Snapshot cache-aside: second start loads instead of rebuilding
//! - Phrase, term and prefix searches through the feed context
//! - Merging a second batch accumulates edge weights

use chrono::NaiveDateTime;
use feed_service::utils::{recency_multiplier, DATE_FORMAT};
use feed_service::{Dataset, FeedContext, SearchOutcome, SearchQuery, SnapshotStore};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn now() -> NaiveDateTime {
    NaiveDateTime::parse_from_str("2024-05-20 12:00:00", DATE_FORMAT).unwrap()
}

fn write_dataset(dir: &Path) {
    fs::write(
        dir.join("friends.json"),
        r#"{"alice": ["bob"], "bob": ["alice"], "carol": []}"#,
    )
    .unwrap();
    fs::write(
        dir.join("comments.json"),
        r#"[{"status_id": "c1", "author": "alice", "comment_published": "2024-05-19 12:00:00"}]"#,
    )
    .unwrap();
    fs::write(
        dir.join("reactions.json"),
        r#"[{"status_id": "c1", "author": "alice", "type_of_reaction": "sparkles", "reacted": "2024-05-19 13:00:00"}]"#,
    )
    .unwrap();
    fs::write(
        dir.join("statuses.json"),
        r#"[
            {"status_id": "b1", "status_message": "Morning Run in the park", "status_link": "https://example.com/b1",
             "status_published": "2024-05-20 08:00:00", "author": "bob", "num_comments": 1},
            {"status_id": "c1", "status_message": "a run of bad luck", "status_link": "https://example.com/c1",
             "status_published": "2024-05-18 09:00:00", "author": "carol"},
            {"status_id": "d1", "status_message": "park closed today", "status_link": "https://example.com/d1",
             "status_published": "2024-05-10 09:00:00", "author": "dave"}
        ]"#,
    )
    .unwrap();
}

fn setup() -> (TempDir, Dataset) {
    let dir = TempDir::new().unwrap();
    write_dataset(dir.path());
    let dataset = Dataset::load_from_directory(dir.path()).unwrap();
    (dir, dataset)
}

#[test]
fn test_friend_status_tops_the_feed() {
    let (_dir, dataset) = setup();
    let mut context = FeedContext::build(dataset, now());

    let feed = context.feed("alice", now());

    assert_eq!(feed.len(), 3);
    assert_eq!(feed[0].status_id, "b1");
    assert_eq!(feed[0].relevance, 352800.0);
    assert_eq!(feed[0].author, "bob");

    // The unknown reaction kind is skipped, only the comment counts
    let carol_edge = 40.0 * recency_multiplier(1);
    assert!((context.graph.weight("alice", "carol").unwrap() - carol_edge).abs() < 1e-9);
    assert_eq!(feed[1].status_id, "c1");
    assert!((feed[1].relevance - carol_edge * recency_multiplier(2)).abs() < 1e-6);

    assert_eq!(feed[2].relevance, 0.0);
    assert_eq!(context.graph.weight("alice", "dave"), Some(0.0));
}

#[test]
fn test_snapshots_are_reused() {
    let (dir, dataset) = setup();
    let store = SnapshotStore::new(
        dir.path().join("cache/graph.bin"),
        dir.path().join("cache/trie.bin"),
    );

    let first = FeedContext::load_or_build(&store, dataset.clone(), now()).unwrap();

    // An empty dataset on the second start still sees the cached artifacts
    let second = FeedContext::load_or_build(&store, Dataset::default(), now()).unwrap();
    assert_eq!(first.graph, second.graph);
    assert_eq!(second.trie.autocomplete("pa"), vec!["park".to_string()]);

    store.invalidate().unwrap();
    let rebuilt = FeedContext::load_or_build(&store, Dataset::default(), now()).unwrap();
    assert!(rebuilt.trie.is_empty());
    assert_eq!(rebuilt.graph.node_count(), 0);
}

#[test]
fn test_searches() {
    let (_dir, dataset) = setup();
    let mut context = FeedContext::build(dataset, now());

    match context.search("alice", &SearchQuery::parse("\"Morning Run\""), now()) {
        SearchOutcome::Feed(feed) => {
            let ids: Vec<&str> = feed.iter().map(|e| e.status_id.as_str()).collect();
            assert_eq!(ids, vec!["b1"]);
        }
        other => panic!("unexpected outcome {:?}", other),
    }

    // Phrases are case-sensitive
    assert_eq!(
        context.search("alice", &SearchQuery::parse("\"morning run\""), now()),
        SearchOutcome::Feed(Vec::new())
    );

    match context.search("alice", &SearchQuery::parse("run park"), now()) {
        SearchOutcome::Feed(feed) => {
            let ids: Vec<&str> = feed.iter().map(|e| e.status_id.as_str()).collect();
            // b1 matches both words and is boosted by 2^10
            assert_eq!(ids[0], "b1");
            assert_eq!(feed[0].relevance, 352800.0 * 1024.0);
            assert_eq!(ids.len(), 3);
        }
        other => panic!("unexpected outcome {:?}", other),
    }

    assert_eq!(
        context.search("alice", &SearchQuery::parse("r*"), now()),
        SearchOutcome::Suggestions(vec!["run".to_string()])
    );
    assert_eq!(
        context.search("alice", &SearchQuery::parse("   "), now()),
        SearchOutcome::Nothing
    );
}

#[test]
fn test_merging_same_batch_doubles_friend_weight() {
    let (dir, dataset) = setup();
    let mut context = FeedContext::build(dataset, now());
    let before = context.trie.node_count();

    let again = Dataset::load_from_directory(dir.path()).unwrap();
    context.merge(again, now());

    assert_eq!(context.graph.weight("alice", "bob"), Some(10000.0));
    assert_eq!(context.trie.node_count(), before);
    assert_eq!(context.corpus.len(), 3);
}
