//! File-per-key snapshot cache.
//!
//! Each key owns one pretty-printed JSON document named `<key>.json` under
//! the cache directory, so entries stay inspectable with ordinary tools.
//! Reads and writes are whole-document; writes stage through a temp file and
//! a rename so a key is either fully updated or left untouched.

use crate::rates::RateSnapshot;
use crate::store::SnapshotStore;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub struct DiskStore {
    dir: PathBuf,
}

impl DiskStore {
    pub fn new(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create cache directory: {}", dir.display()))?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[async_trait]
impl SnapshotStore for DiskStore {
    async fn get(&self, key: &str) -> Option<RateSnapshot> {
        let path = self.entry_path(key);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(key, "cache miss");
                return None;
            }
            Err(e) => {
                warn!(key, error = %e, "cache read failed, treating as miss");
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(snapshot) => {
                debug!(key, "cache hit");
                Some(snapshot)
            }
            Err(e) => {
                warn!(key, error = %e, "unreadable cache entry, treating as miss");
                None
            }
        }
    }

    async fn put(&self, key: &str, snapshot: &RateSnapshot) -> Result<()> {
        let path = self.entry_path(key);
        let staging = self.dir.join(format!("{key}.json.tmp"));
        let json = serde_json::to_string_pretty(snapshot)?;

        tokio::fs::write(&staging, json)
            .await
            .with_context(|| format!("Failed to stage cache entry: {}", staging.display()))?;
        tokio::fs::rename(&staging, &path)
            .await
            .with_context(|| format!("Failed to commit cache entry: {}", path.display()))?;

        debug!(key, "cache saved");
        Ok(())
    }
}
