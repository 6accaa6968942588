//! Misbehaving stores for exercising the cache's failure paths.

use std::time::Duration;

use async_trait::async_trait;

use super::PersistentStore;
use crate::cache::CacheEntry;
use crate::error::{CacheError, Result};

fn offline() -> CacheError {
    CacheError::Internal("store offline".into())
}

/// Store whose every call fails.
pub struct FailingStore;

#[async_trait]
impl PersistentStore for FailingStore {
    async fn get(&self, _key: &str) -> Result<Option<CacheEntry>> {
        Err(offline())
    }

    async fn put(&self, _key: &str, _entry: &CacheEntry) -> Result<()> {
        Err(offline())
    }

    async fn delete(&self, _key: &str) -> Result<()> {
        Err(offline())
    }

    async fn clear(&self) -> Result<()> {
        Err(offline())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        Err(offline())
    }
}

/// Store whose reads and writes never finish in any reasonable time.
pub struct StalledStore;

#[async_trait]
impl PersistentStore for StalledStore {
    async fn get(&self, _key: &str) -> Result<Option<CacheEntry>> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(None)
    }

    async fn put(&self, _key: &str, _entry: &CacheEntry) -> Result<()> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(())
    }

    async fn delete(&self, _key: &str) -> Result<()> {
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        Ok(())
    }
}
