//! Expired Entry Sweep Task
//!
//! Background task that periodically drops expired entries from the memory
//! layer, so entries nobody reads again do not hold capacity until evicted.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheManager;

/// Spawns a background task that sweeps expired memory-layer entries.
///
/// The task runs until aborted, sleeping `sweep_interval` between runs.
/// Returns the JoinHandle so the caller can abort it on shutdown.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(CacheManager::memory_only(&Config::default()));
/// let sweep_handle = spawn_sweep_task(cache.clone(), Duration::from_secs(60));
/// // Later, during shutdown:
/// sweep_handle.abort();
/// ```
pub fn spawn_sweep_task(cache: Arc<CacheManager>, sweep_interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "Starting expired entry sweep with interval of {:?}",
            sweep_interval
        );

        loop {
            tokio::time::sleep(sweep_interval).await;

            let removed = cache.purge_expired().await;
            if removed > 0 {
                info!("Cache sweep: removed {} expired entries", removed);
            } else {
                debug!("Cache sweep: no expired entries found");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use serde_json::json;

    fn manager() -> Arc<CacheManager> {
        Arc::new(CacheManager::memory_only(&Config::default()))
    }

    #[tokio::test]
    async fn test_sweep_removes_expired_entries() {
        let cache = manager();
        cache.set("expire_soon", &json!(1), Some(50)).await;

        let handle = spawn_sweep_task(cache.clone(), Duration::from_millis(100));

        tokio::time::sleep(Duration::from_millis(350)).await;

        // Gone without any read touching it
        assert!(!cache.is_resident("expire_soon").await);
        assert_eq!(cache.get_stats().await.misses, 0);

        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_preserves_valid_entries() {
        let cache = manager();
        cache.set("long_lived", &json!("value"), Some(3_600_000)).await;

        let handle = spawn_sweep_task(cache.clone(), Duration::from_millis(50));

        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(cache.get_value("long_lived").await, Some(json!("value")));

        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_task_can_be_aborted() {
        let handle = spawn_sweep_task(manager(), Duration::from_secs(1));

        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
