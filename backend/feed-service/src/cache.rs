//! File-backed snapshot cache for the affinity graph and the search trie
//!
//! Cache-aside strategy:
//! - load the snapshot when its file exists
//! - otherwise build the artifact and write the snapshot
//!
//! Snapshots are never checked for staleness. Call `invalidate` (or set
//! `FEED_REBUILD_CACHE=true`) after the dataset changes to force a rebuild.

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::services::affinity::AffinityGraph;
use crate::services::search::SearchTrie;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Snapshot files for the graph and the trie
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    graph_path: PathBuf,
    trie_path: PathBuf,
}

impl SnapshotStore {
    pub fn new(graph_path: impl Into<PathBuf>, trie_path: impl Into<PathBuf>) -> Self {
        Self {
            graph_path: graph_path.into(),
            trie_path: trie_path.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.graph_cache_path, &config.trie_cache_path)
    }

    pub fn graph_path(&self) -> &Path {
        &self.graph_path
    }

    pub fn trie_path(&self) -> &Path {
        &self.trie_path
    }

    pub fn load_graph(&self) -> Result<Option<AffinityGraph>> {
        load_snapshot(&self.graph_path)
    }

    pub fn save_graph(&self, graph: &AffinityGraph) -> Result<()> {
        save_snapshot(&self.graph_path, graph)
    }

    pub fn load_trie(&self) -> Result<Option<SearchTrie>> {
        load_snapshot(&self.trie_path)
    }

    pub fn save_trie(&self, trie: &SearchTrie) -> Result<()> {
        save_snapshot(&self.trie_path, trie)
    }

    /// Load the graph snapshot, or build it with `build` and persist it.
    pub fn load_or_build_graph<F>(&self, build: F) -> Result<AffinityGraph>
    where
        F: FnOnce() -> AffinityGraph,
    {
        if let Some(graph) = self.load_graph()? {
            info!(
                path = %self.graph_path.display(),
                nodes = graph.node_count(),
                edges = graph.edge_count(),
                "Found affinity graph snapshot"
            );
            return Ok(graph);
        }

        info!(path = %self.graph_path.display(), "Affinity graph snapshot not found, building");
        let graph = build();
        self.save_graph(&graph)?;
        Ok(graph)
    }

    /// Load the trie snapshot, or build it with `build` and persist it.
    pub fn load_or_build_trie<F>(&self, build: F) -> Result<SearchTrie>
    where
        F: FnOnce() -> SearchTrie,
    {
        if let Some(trie) = self.load_trie()? {
            info!(
                path = %self.trie_path.display(),
                nodes = trie.node_count(),
                "Found search trie snapshot"
            );
            return Ok(trie);
        }

        info!(path = %self.trie_path.display(), "Search trie snapshot not found, building");
        let trie = build();
        self.save_trie(&trie)?;
        Ok(trie)
    }

    /// Delete both snapshot files. Missing files are not an error.
    pub fn invalidate(&self) -> Result<()> {
        for path in [&self.graph_path, &self.trie_path] {
            match fs::remove_file(path) {
                Ok(()) => info!(path = %path.display(), "Snapshot invalidated"),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

fn load_snapshot<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "Snapshot cache miss");
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    let value = bincode::deserialize_from(BufReader::new(file)).map_err(|e| {
        AppError::Snapshot(format!("failed to decode {}: {}", path.display(), e))
    })?;

    debug!(path = %path.display(), "Snapshot cache hit");
    Ok(Some(value))
}

fn save_snapshot<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(path)?);
    bincode::serialize_into(&mut writer, value).map_err(|e| {
        AppError::Snapshot(format!("failed to encode {}: {}", path.display(), e))
    })?;
    writer.flush()?;

    info!(path = %path.display(), "Snapshot saved");
    Ok(())
}
