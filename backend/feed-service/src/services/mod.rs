//! Service layer for feed-service
//!
//! - affinity: weighted viewer → author graph built from friendships and interactions
//! - search: trie index over status messages
//! - ranking: relevance scoring and top-N feed selection

pub mod affinity;
pub mod ranking;
pub mod search;

pub use affinity::{build_or_update, AffinityGraph, GraphBuildReport};
pub use ranking::{popularity_score, rank_feed, FEED_SIZE};
pub use search::{SearchQuery, SearchTrie};
