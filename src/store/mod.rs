//! Snapshot cache storage.

pub mod disk;
pub mod memory;

pub use disk::DiskStore;
pub use memory::MemoryStore;

use crate::rates::RateSnapshot;
use anyhow::Result;
use async_trait::async_trait;

/// Key-value persistence for resolved rate snapshots.
///
/// `get` never fails: absence and unreadable entries both come back as
/// `None`, because the cache is an optimization rather than a source of
/// truth. `put` reports failure so the caller can log it and move on; a
/// failed write must never abort an in-flight resolution.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn get(&self, key: &str) -> Option<RateSnapshot>;
    async fn put(&self, key: &str, snapshot: &RateSnapshot) -> Result<()>;
}
