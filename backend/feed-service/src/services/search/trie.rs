//! Letter trie over status messages.
//!
//! Nodes live in a `Vec` and reference children by index. Each word of an
//! inserted message is walked from the root, and every node on the way records
//! the ids of the statuses that passed through it.
//!
//! The letter index maps a character to every node carrying that character,
//! wherever it sits in the tree. Queries start from those nodes directly, so a
//! query matches any contiguous letter run inside an indexed word, not only
//! word prefixes. The index holds node indices only; the arena owns the nodes.

use super::text::{letters_only, normalize_case_sensitive, normalize_lowercase, split_words};
use crate::models::{StatusCorpus, StatusId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

type NodeId = usize;

const ROOT: NodeId = 0;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TrieNode {
    children: HashMap<char, NodeId>,
    status_ids: HashSet<StatusId>,
    /// Number of times an inserted word passed through this node
    counter: u64,
    terminal: bool,
}

impl TrieNode {
    fn new() -> Self {
        Self {
            children: HashMap::new(),
            status_ids: HashSet::new(),
            counter: 0,
            terminal: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchTrie {
    nodes: Vec<TrieNode>,
    letter_index: HashMap<char, Vec<NodeId>>,
}

impl Default for SearchTrie {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchTrie {
    pub fn new() -> Self {
        Self {
            nodes: vec![TrieNode::new()],
            letter_index: HashMap::new(),
        }
    }

    /// Index every word of `text` under `status_id`.
    pub fn insert(&mut self, text: &str, status_id: &str) {
        let normalized = normalize_lowercase(text);

        for word in split_words(&normalized) {
            let mut current = ROOT;
            for letter in word.chars() {
                current = self.child_or_insert(current, letter);

                let node = &mut self.nodes[current];
                if !node.status_ids.contains(status_id) {
                    node.status_ids.insert(status_id.to_string());
                }
                node.counter += 1;
            }
            self.nodes[current].terminal = true;
        }
    }

    /// Ids of statuses containing the letters of `term` as one contiguous run.
    ///
    /// Spaces in `term` are dropped before matching, so `"hello world"` looks
    /// for `helloworld`.
    pub fn query(&self, term: &str) -> HashSet<StatusId> {
        let letters: Vec<char> = letters_only(term).chars().collect();
        let mut ids = HashSet::new();

        let Some((first, rest)) = letters.split_first() else {
            return ids;
        };
        let Some(bucket) = self.letter_index.get(first) else {
            return ids;
        };

        for &start in bucket {
            if let Some(end) = self.descend(start, rest) {
                ids.extend(self.nodes[end].status_ids.iter().cloned());
            }
        }

        ids
    }

    /// Complete words starting with `prefix`, in alphabetical order. An empty
    /// prefix lists the whole vocabulary.
    pub fn autocomplete(&self, prefix: &str) -> Vec<String> {
        let prefix = letters_only(prefix);
        let letters: Vec<char> = prefix.chars().collect();
        let Some(start) = self.descend(ROOT, &letters) else {
            return Vec::new();
        };

        let mut words = Vec::new();
        let mut stack = vec![(start, prefix)];

        while let Some((node_id, word)) = stack.pop() {
            let node = &self.nodes[node_id];
            if node.terminal {
                words.push(word.clone());
            }

            let mut children: Vec<(char, NodeId)> =
                node.children.iter().map(|(c, id)| (*c, *id)).collect();
            children.sort_unstable_by(|a, b| b.0.cmp(&a.0));

            for (letter, child) in children {
                let mut next = word.clone();
                next.push(letter);
                stack.push((child, next));
            }
        }

        words
    }

    /// Statuses whose message contains the quoted phrase, case-sensitively
    /// and with the words in order.
    pub fn phrase_search(&self, quoted_phrase: &str, corpus: &StatusCorpus) -> Vec<StatusId> {
        let phrase = normalize_case_sensitive(quoted_phrase.trim().trim_matches('"'));
        let words: Vec<&str> = split_words(&phrase).collect();
        if words.is_empty() {
            return Vec::new();
        }

        let mut candidates: Option<HashSet<StatusId>> = None;
        for word in &words {
            let ids = self.query(word);
            let narrowed = match candidates {
                None => ids,
                Some(current) => current.intersection(&ids).cloned().collect(),
            };
            let exhausted = narrowed.is_empty();
            candidates = Some(narrowed);
            if exhausted {
                break;
            }
        }

        let mut matches: Vec<StatusId> = candidates
            .unwrap_or_default()
            .into_iter()
            .filter(|id| {
                corpus
                    .get(id)
                    .is_some_and(|status| contains_phrase(&status.message, &words))
            })
            .collect();
        matches.sort();
        matches
    }

    /// Number of distinct words of `term` matched by each status.
    pub fn union_search(&self, term: &str) -> HashMap<StatusId, u32> {
        let normalized = normalize_lowercase(term);
        let mut seen = HashSet::new();
        let mut counts: HashMap<StatusId, u32> = HashMap::new();

        for word in split_words(&normalized) {
            if !seen.insert(word) {
                continue;
            }
            for id in self.query(word) {
                *counts.entry(id).or_insert(0) += 1;
            }
        }

        counts
    }

    /// How many times `word` was walked to its last letter from the root.
    pub fn visit_count(&self, word: &str) -> Option<u64> {
        let letters: Vec<char> = letters_only(word).chars().collect();
        if letters.is_empty() {
            return None;
        }
        self.descend(ROOT, &letters)
            .map(|node_id| self.nodes[node_id].counter)
    }

    /// Nodes in the tree, root excluded.
    pub fn node_count(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Distinct complete words in the tree.
    pub fn word_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.terminal).count()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    fn child_or_insert(&mut self, parent: NodeId, letter: char) -> NodeId {
        if let Some(&child) = self.nodes[parent].children.get(&letter) {
            return child;
        }

        let child = self.nodes.len();
        self.nodes.push(TrieNode::new());
        self.nodes[parent].children.insert(letter, child);
        self.letter_index.entry(letter).or_default().push(child);
        child
    }

    fn descend(&self, start: NodeId, letters: &[char]) -> Option<NodeId> {
        let mut current = start;
        for letter in letters {
            current = *self.nodes[current].children.get(letter)?;
        }
        Some(current)
    }
}

/// Whether `words` occur as a contiguous, ordered, case-sensitive run in `message`.
///
/// Every position is tried, not only the first occurrence of `words[0]`, so
/// "Quick fox Quick Brown" matches `["Quick", "Brown"]`.
fn contains_phrase(message: &str, words: &[&str]) -> bool {
    let normalized = normalize_case_sensitive(message);
    let message_words: Vec<&str> = split_words(&normalized).collect();

    if words.iter().any(|word| !message_words.contains(word)) {
        return false;
    }

    message_words
        .windows(words.len())
        .any(|window| window == words)
}
