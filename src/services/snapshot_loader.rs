//! Snapshot loading service
//!
//! Reads the store's point-in-time export:
//! `{ "providers": [...], "subscriptions": [...] }`.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use super::config::data_dir;
use crate::types::{Result, Snapshot, SubtrackError};

pub struct SnapshotLoader {
    path: PathBuf,
}

impl SnapshotLoader {
    /// Loader for the default snapshot (~/.subtrack/snapshot.json)
    pub fn new() -> Result<Self> {
        Ok(Self::with_path(Self::default_path()?))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn default_path() -> Result<PathBuf> {
        Ok(data_dir()?.join("snapshot.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Snapshot> {
        let content = fs::read_to_string(&self.path)?;
        let snapshot: Snapshot = serde_json::from_str(&content).map_err(|e| {
            SubtrackError::Parse(format!("Invalid snapshot {}: {}", self.path.display(), e))
        })?;

        let mut seen = HashSet::new();
        for sub in &snapshot.subscriptions {
            if !seen.insert(&sub.id) {
                tracing::warn!(subscription = %sub.id, "duplicate subscription id in snapshot");
            }
        }

        tracing::debug!(
            path = %self.path.display(),
            providers = snapshot.providers.len(),
            subscriptions = snapshot.subscriptions.len(),
            "loaded snapshot"
        );
        Ok(snapshot)
    }
}
