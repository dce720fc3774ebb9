//! Feed context: the affinity graph, the search trie and the status corpus
//! they were built from, plus the feed and search entry points.

use crate::cache::SnapshotStore;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::models::{FeedEntry, Status, StatusCorpus};
use crate::services::affinity::{build_or_update_with_report, AffinityGraph};
use crate::services::ranking::rank_feed;
use crate::services::search::{SearchQuery, SearchTrie};
use chrono::NaiveDateTime;
use tracing::{debug, info};

/// Result of one search box submission
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Nothing,
    Suggestions(Vec<String>),
    Feed(Vec<FeedEntry>),
}

#[derive(Debug, Clone, Default)]
pub struct FeedContext {
    pub graph: AffinityGraph,
    pub trie: SearchTrie,
    pub corpus: StatusCorpus,
}

impl FeedContext {
    /// Build the graph and the trie from scratch.
    pub fn build(dataset: Dataset, now: NaiveDateTime) -> Self {
        let graph = build_graph(None, &dataset, &dataset.statuses, now);
        let trie = build_trie(&dataset.statuses);

        Self {
            graph,
            trie,
            corpus: dataset.statuses,
        }
    }

    /// Load both artifacts from `store`, building and saving whichever is missing.
    pub fn load_or_build(store: &SnapshotStore, dataset: Dataset, now: NaiveDateTime) -> Result<Self> {
        let graph = store.load_or_build_graph(|| build_graph(None, &dataset, &dataset.statuses, now))?;
        let trie = store.load_or_build_trie(|| build_trie(&dataset.statuses))?;

        Ok(Self {
            graph,
            trie,
            corpus: dataset.statuses,
        })
    }

    pub fn save(&self, store: &SnapshotStore) -> Result<()> {
        store.save_graph(&self.graph)?;
        store.save_trie(&self.trie)
    }

    /// Fold another batch in. Edge weights accumulate; only statuses not yet
    /// in the corpus are indexed.
    pub fn merge(&mut self, dataset: Dataset, now: NaiveDateTime) {
        let Dataset {
            friends,
            events,
            statuses,
        } = dataset;

        let mut indexed = 0;
        for (id, status) in statuses {
            if !self.corpus.contains_key(&id) {
                self.trie.insert(&status.message, &id);
                indexed += 1;
            }
            self.corpus.insert(id, status);
        }

        let batch = Dataset {
            friends,
            events,
            statuses: StatusCorpus::new(),
        };
        let graph = std::mem::take(&mut self.graph);
        self.graph = build_graph(Some(graph), &batch, &self.corpus, now);

        info!(indexed, corpus = self.corpus.len(), "Merged dataset batch");
    }

    /// Ranked feed over the whole corpus.
    pub fn feed(&mut self, viewer: &str, now: NaiveDateTime) -> Vec<FeedEntry> {
        rank_feed(&mut self.graph, viewer, self.corpus.values(), None, now)
    }

    pub fn search(&mut self, viewer: &str, query: &SearchQuery, now: NaiveDateTime) -> SearchOutcome {
        match query {
            SearchQuery::Empty => SearchOutcome::Nothing,
            SearchQuery::Autocomplete(prefix) => {
                SearchOutcome::Suggestions(self.trie.autocomplete(prefix))
            }
            SearchQuery::Phrase(phrase) => {
                let ids = self.trie.phrase_search(phrase, &self.corpus);
                debug!(viewer, matches = ids.len(), "Phrase search");

                let matched: Vec<&Status> =
                    ids.iter().filter_map(|id| self.corpus.get(id)).collect();
                SearchOutcome::Feed(rank_feed(&mut self.graph, viewer, matched, None, now))
            }
            SearchQuery::Terms(terms) => {
                let counts = self.trie.union_search(terms);
                debug!(viewer, matches = counts.len(), "Term search");

                let matched = self
                    .corpus
                    .values()
                    .filter(|status| counts.contains_key(&status.id));
                SearchOutcome::Feed(rank_feed(
                    &mut self.graph,
                    viewer,
                    matched,
                    Some(&counts),
                    now,
                ))
            }
        }
    }
}

fn build_graph(
    graph: Option<AffinityGraph>,
    dataset: &Dataset,
    corpus: &StatusCorpus,
    now: NaiveDateTime,
) -> AffinityGraph {
    let (graph, report) =
        build_or_update_with_report(graph, &dataset.friends, &dataset.events, corpus, now);
    if report.skipped_events > 0 {
        info!(skipped = report.skipped_events, "Some interactions were not weighted");
    }
    graph
}

fn build_trie(corpus: &StatusCorpus) -> SearchTrie {
    let mut trie = SearchTrie::new();
    for status in corpus.values() {
        trie.insert(&status.message, &status.id);
    }
    info!(statuses = corpus.len(), nodes = trie.node_count(), "Search trie built");
    trie
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InteractionEvent, ReactionCounts};
    use crate::utils::DATE_FORMAT;
    use chrono::Duration;
    use tempfile::TempDir;

    fn now() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2024-05-20 12:00:00", DATE_FORMAT).unwrap()
    }

    fn status(id: &str, author: &str, message: &str, days_ago: i64) -> Status {
        Status {
            id: id.to_string(),
            author: author.to_string(),
            message: message.to_string(),
            link: String::new(),
            published: now() - Duration::days(days_ago),
            reactions: ReactionCounts::default(),
            num_comments: 0,
            num_shares: 0,
        }
    }

    fn dataset() -> Dataset {
        let mut dataset = Dataset::default();
        dataset.friends.insert(
            "alice".to_string(),
            ["bob".to_string()].into_iter().collect(),
        );
        dataset.friends.insert(
            "bob".to_string(),
            ["alice".to_string()].into_iter().collect(),
        );
        for s in [
            status("s1", "bob", "Quick brown fox", 0),
            status("s2", "carol", "the quick dog jumps", 0),
            status("s3", "carol", "lazy afternoon", 3),
        ] {
            dataset.statuses.insert(s.id.clone(), s);
        }
        dataset
    }

    #[test]
    fn test_build_indexes_every_status() {
        let context = FeedContext::build(dataset(), now());

        assert_eq!(context.corpus.len(), 3);
        assert_eq!(context.graph.weight("alice", "bob"), Some(5000.0));
        assert_eq!(context.trie.query("quick").len(), 2);
    }

    #[test]
    fn test_feed_puts_friends_first() {
        let mut context = FeedContext::build(dataset(), now());

        let feed = context.feed("alice", now());

        assert_eq!(feed.len(), 3);
        assert_eq!(feed[0].status_id, "s1");
        assert_eq!(feed[0].relevance, 5000.0 * 70.0);
    }

    #[test]
    fn test_search_dispatch() {
        let mut context = FeedContext::build(dataset(), now());

        assert_eq!(
            context.search("alice", &SearchQuery::Empty, now()),
            SearchOutcome::Nothing
        );
        assert_eq!(
            context.search("alice", &SearchQuery::parse("qu*"), now()),
            SearchOutcome::Suggestions(vec!["quick".to_string()])
        );

        match context.search("alice", &SearchQuery::parse("*"), now()) {
            SearchOutcome::Suggestions(words) => {
                assert_eq!(words.len(), 8);
                assert_eq!(words[0], "afternoon");
            }
            other => panic!("unexpected outcome {:?}", other),
        }

        match context.search("alice", &SearchQuery::parse("\"quick dog\""), now()) {
            SearchOutcome::Feed(feed) => {
                assert_eq!(feed.len(), 1);
                assert_eq!(feed[0].status_id, "s2");
            }
            other => panic!("unexpected outcome {:?}", other),
        }

        match context.search("alice", &SearchQuery::parse("lazy"), now()) {
            SearchOutcome::Feed(feed) => {
                assert_eq!(feed.len(), 1);
                assert_eq!(feed[0].status_id, "s3");
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_merge_indexes_new_statuses_and_accumulates_weights() {
        let mut context = FeedContext::build(dataset(), now());

        let mut batch = dataset();
        batch.statuses.insert(
            "s4".to_string(),
            status("s4", "bob", "fresh quick news", 0),
        );
        batch.push_event(InteractionEvent::Comment {
            actor: "carol".to_string(),
            target_status: "s1".to_string(),
            timestamp: now(),
        });
        context.merge(batch, now());

        assert_eq!(context.corpus.len(), 4);
        assert_eq!(context.trie.query("quick").len(), 3);
        // Existing statuses are not indexed twice
        assert_eq!(context.trie.visit_count("lazy"), Some(1));
        assert_eq!(context.graph.weight("alice", "bob"), Some(10000.0));
    }

    #[test]
    fn test_load_or_build_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path().join("g.bin"), dir.path().join("t.bin"));

        let built = FeedContext::load_or_build(&store, dataset(), now()).unwrap();
        assert!(store.graph_path().exists());
        assert!(store.trie_path().exists());

        let loaded = FeedContext::load_or_build(&store, dataset(), now()).unwrap();
        assert_eq!(built.graph, loaded.graph);
        assert_eq!(loaded.trie.autocomplete("la"), vec!["lazy".to_string()]);
    }
}
