//! In-memory snapshot store.

use crate::rates::RateSnapshot;
use crate::store::SnapshotStore;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// HashMap-backed store used in tests and when no cache directory is
/// available. Contents do not survive the process.
#[derive(Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<HashMap<String, RateSnapshot>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn get(&self, key: &str) -> Option<RateSnapshot> {
        let entries = self.inner.lock().await;
        let value = entries.get(key).cloned();
        if value.is_some() {
            debug!(key, "cache hit");
        } else {
            debug!(key, "cache miss");
        }
        value
    }

    async fn put(&self, key: &str, snapshot: &RateSnapshot) -> Result<()> {
        let mut entries = self.inner.lock().await;
        entries.insert(key.to_string(), snapshot.clone());
        debug!(key, "cache saved");
        Ok(())
    }
}
