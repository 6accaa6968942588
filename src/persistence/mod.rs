//! Persistent Layer Module
//!
//! Durable key to entry storage that backs the memory layer across process
//! restarts. The cache manager is the only client and treats every error as
//! "no data".
//!
//! # Backends
//! - [`FileStore`]: one JSON file per key under a directory
//! - [`InMemoryStore`]: process-local map, for embedding and tests

mod file;
mod memory;

#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;

use crate::cache::CacheEntry;
use crate::error::Result;

pub use file::FileStore;
pub use memory::InMemoryStore;

/// Key read by the default reachability probe.
pub const PROBE_KEY: &str = "__match_cache_probe__";

// == Persistent Store ==
/// Durable, origin-local storage addressed by cache key.
#[async_trait]
pub trait PersistentStore: Send + Sync {
    /// Reads an entry. A missing key is `Ok(None)`, never an error.
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>>;

    /// Upserts an entry. Last writer wins and no partial write is visible.
    async fn put(&self, key: &str, entry: &CacheEntry) -> Result<()>;

    /// Removes an entry. Deleting an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Removes every entry in every namespace the store manages.
    async fn clear(&self) -> Result<()>;

    /// Lists stored keys. Stores that cannot enumerate report none.
    async fn keys(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    /// Checks that the storage engine is reachable.
    async fn ping(&self) -> Result<()> {
        self.get(PROBE_KEY).await.map(|_| ())
    }
}
