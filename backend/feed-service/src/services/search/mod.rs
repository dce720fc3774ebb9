/// Search Module
///
/// Trie-backed full-text search over status messages:
/// - letter-run lookup (`query`) and per-word match counting (`union_search`)
/// - prefix autocompletion over complete words
/// - case-sensitive, order-preserving phrase matching
pub mod text;
pub mod trie;

pub use trie::SearchTrie;

/// A raw search box input classified into the operation it asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchQuery {
    Empty,
    /// Input ended with `*`; holds the text before it
    Autocomplete(String),
    /// Input fully wrapped in double quotes, quotes included
    Phrase(String),
    Terms(String),
}

impl SearchQuery {
    pub fn parse(input: &str) -> Self {
        let input = input.trim();

        if input.is_empty() {
            SearchQuery::Empty
        } else if let Some(prefix) = input.strip_suffix('*') {
            SearchQuery::Autocomplete(prefix.to_string())
        } else if input.len() >= 2 && input.starts_with('"') && input.ends_with('"') {
            SearchQuery::Phrase(input.to_string())
        } else {
            SearchQuery::Terms(input.to_string())
        }
    }
}
