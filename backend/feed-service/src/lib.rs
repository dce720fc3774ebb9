pub mod cache;
pub mod config;
pub mod context;
pub mod dataset;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use cache::SnapshotStore;
pub use config::Config;
pub use context::{FeedContext, SearchOutcome};
pub use dataset::Dataset;
pub use error::{AppError, Result};

pub use services::{rank_feed, AffinityGraph, SearchQuery, SearchTrie, FEED_SIZE};
