use crate::error::{AppError, Result};
use serde::Deserialize;
use std::path::PathBuf;

const ENV_PREFIX: &str = "FEED_";

/// Service configuration, read from `FEED_*` environment variables
/// (and a `.env` file when present).
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Directory holding the interaction dataset JSON files
    #[serde(default = "default_dataset_dir")]
    pub dataset_dir: PathBuf,
    /// Affinity graph snapshot file
    #[serde(default = "default_graph_cache_path")]
    pub graph_cache_path: PathBuf,
    /// Search trie snapshot file
    #[serde(default = "default_trie_cache_path")]
    pub trie_cache_path: PathBuf,
    /// Delete both snapshots on startup so they are rebuilt from the dataset
    #[serde(default)]
    pub rebuild_cache: bool,
    /// Emit JSON log lines instead of the human-readable format
    #[serde(default)]
    pub log_json: bool,
}

fn default_dataset_dir() -> PathBuf {
    PathBuf::from("dataset")
}

fn default_graph_cache_path() -> PathBuf {
    PathBuf::from("graph.bin")
}

fn default_trie_cache_path() -> PathBuf {
    PathBuf::from("trie.bin")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dataset_dir: default_dataset_dir(),
            graph_cache_path: default_graph_cache_path(),
            trie_cache_path: default_trie_cache_path(),
            rebuild_cache: false,
            log_json: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config: Config = envy::prefixed(ENV_PREFIX).from_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.dataset_dir.as_os_str().is_empty() {
            return Err(AppError::Configuration(
                "FEED_DATASET_DIR must not be empty".to_string(),
            ));
        }

        if self.graph_cache_path.as_os_str().is_empty()
            || self.trie_cache_path.as_os_str().is_empty()
        {
            return Err(AppError::Configuration(
                "Snapshot cache paths must not be empty".to_string(),
            ));
        }

        if self.graph_cache_path == self.trie_cache_path {
            return Err(AppError::Configuration(
                "Graph and trie snapshots must use different files".to_string(),
            ));
        }

        Ok(())
    }
}
