//! Cache Manager Module
//!
//! Orchestrates the memory layer in front of the persistent store: layered
//! lookup with promotion, TTL expiry, LRU eviction, invalidation, preload,
//! warmup and introspection.
//!
//! The cache is an optimization only. No public method returns an error:
//! every storage failure is logged and turned into a miss, `false` or zero.

use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::cache::health::{HealthReport, PersistentLayerStatus};
use crate::cache::memory::{Lookup, MemoryLayer};
use crate::cache::pattern::wildcard_match;
use crate::cache::preload::{is_truthy, PreloadEntry, PreloadSummary};
use crate::cache::{validate_key, CacheEntry, CacheSize, CacheStats, CacheStatsReport};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::persistence::PersistentStore;

/// Memory layer and counters, always mutated together under one guard.
#[derive(Debug)]
struct CacheState {
    memory: MemoryLayer,
    stats: CacheStats,
}

impl CacheState {
    fn insert(&mut self, entry: CacheEntry) {
        if let Some(evicted) = self.memory.insert(entry) {
            self.stats.record_eviction();
            debug!(key = %evicted, "Evicted least recently used entry");
        }
    }
}

// == Cache Manager ==
/// Two-layer cache shared by every data-access service.
///
/// Build one per process and hand out `Arc<CacheManager>`.
pub struct CacheManager {
    state: RwLock<CacheState>,
    /// `None` when the persistent layer is disabled
    store: Option<Arc<dyn PersistentStore>>,
    default_ttl_ms: u64,
    store_timeout: Duration,
    pattern_scans_persistent: bool,
    essential_keys: Vec<String>,
}

impl CacheManager {
    // == Constructors ==
    /// Creates a manager over `store`, which is ignored when
    /// `config.use_persistent_layer` is false.
    pub fn new(config: &Config, store: Arc<dyn PersistentStore>) -> Self {
        let store = config.use_persistent_layer.then_some(store);
        Self::build(config, store)
    }

    /// Creates a manager with no persistent layer.
    pub fn memory_only(config: &Config) -> Self {
        Self::build(config, None)
    }

    fn build(config: &Config, store: Option<Arc<dyn PersistentStore>>) -> Self {
        Self {
            state: RwLock::new(CacheState {
                memory: MemoryLayer::new(config.max_memory_items),
                stats: CacheStats::new(),
            }),
            store,
            default_ttl_ms: config.default_ttl_ms,
            store_timeout: Duration::from_millis(config.store_timeout_ms),
            pattern_scans_persistent: config.pattern_scans_persistent,
            essential_keys: config.essential_keys.clone(),
        }
    }

    pub fn persistent_layer_enabled(&self) -> bool {
        self.store.is_some()
    }

    pub fn essential_keys(&self) -> &[String] {
        &self.essential_keys
    }

    /// Runs a store call under the configured timeout.
    async fn bounded<T>(&self, call: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::time::timeout(self.store_timeout, call)
            .await
            .map_err(|_| CacheError::Timeout(self.store_timeout.as_millis() as u64))?
    }

    // == Get ==
    /// Looks up `key` and decodes it into `T`.
    ///
    /// A payload that does not fit `T` is logged and reported as absent.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.get_value(key).await?;
        match serde_json::from_value(value) {
            Ok(data) => Some(data),
            Err(e) => {
                warn!(key, "Cached payload has an unexpected shape: {}", e);
                None
            }
        }
    }

    /// Looks up `key` in memory, then in the persistent layer.
    ///
    /// A persistent hit is promoted into memory. Expired entries are dropped
    /// from whichever layer held them.
    pub async fn get_value(&self, key: &str) -> Option<Value> {
        {
            let mut state = self.state.write().await;
            match state.memory.lookup(key) {
                Lookup::Hit(data) => {
                    state.stats.record_memory_hit();
                    debug!(key, "Memory cache hit");
                    return Some(data);
                }
                Lookup::Expired => debug!(key, "Dropped expired entry from memory"),
                Lookup::Absent => {}
            }
        }

        if let Some(data) = self.get_persistent(key).await {
            return Some(data);
        }

        self.state.write().await.stats.record_miss();
        debug!(key, "Cache miss");
        None
    }

    async fn get_persistent(&self, key: &str) -> Option<Value> {
        let store = self.store.as_ref()?;

        let mut entry = match self.bounded(store.get(key)).await {
            Ok(Some(entry)) => entry,
            Ok(None) => return None,
            Err(e) => {
                warn!(key, "Persistent cache read failed: {}", e);
                return None;
            }
        };

        if entry.is_expired() {
            debug!(key, "Dropped expired entry from persistent layer");
            if let Err(e) = self.bounded(store.delete(key)).await {
                warn!(key, "Failed to delete expired persistent entry: {}", e);
            }
            return None;
        }

        entry.key = key.to_string();
        let data = entry.data.clone();

        let mut state = self.state.write().await;
        state.stats.record_persistent_hit();
        state.insert(entry);
        debug!(key, "Persistent cache hit, promoted to memory");
        Some(data)
    }

    // == Set ==
    /// Stores `data` under `key` for `ttl_ms` (default TTL when `None`).
    ///
    /// Returns false when the payload cannot be serialized, the key is
    /// empty, or the persistent write fails. In the last case the memory
    /// write still stands.
    pub async fn set<T: Serialize + ?Sized>(
        &self,
        key: &str,
        data: &T,
        ttl_ms: Option<u64>,
    ) -> bool {
        match serde_json::to_value(data) {
            Ok(value) => self.set_value(key, value, ttl_ms).await,
            Err(e) => {
                warn!(key, "Cache payload is not serializable: {}", e);
                false
            }
        }
    }

    pub async fn set_value(&self, key: &str, data: Value, ttl_ms: Option<u64>) -> bool {
        if let Err(e) = validate_key(key) {
            warn!("Rejected cache write: {}", e);
            return false;
        }

        let entry = CacheEntry::new(key, data, ttl_ms.unwrap_or(self.default_ttl_ms));

        {
            let mut state = self.state.write().await;
            state.insert(entry.clone());
            state.stats.record_set();
        }

        let Some(store) = &self.store else {
            return true;
        };
        match self.bounded(store.put(key, &entry)).await {
            Ok(()) => true,
            Err(e) => {
                warn!(key, "Persistent cache write failed: {}", e);
                false
            }
        }
    }

    // == Invalidate ==
    /// Removes `key` from both layers. An absent key still succeeds.
    pub async fn invalidate(&self, key: &str) -> bool {
        self.remove_everywhere(key).await.1
    }

    /// Returns (was resident in memory, persistent delete succeeded).
    async fn remove_everywhere(&self, key: &str) -> (bool, bool) {
        let was_resident = {
            let mut state = self.state.write().await;
            state.stats.record_invalidation();
            state.memory.remove(key)
        };

        let Some(store) = &self.store else {
            return (was_resident, true);
        };
        match self.bounded(store.delete(key)).await {
            Ok(()) => (was_resident, true),
            Err(e) => {
                warn!(key, "Persistent cache delete failed: {}", e);
                (was_resident, false)
            }
        }
    }

    /// Invalidates every key matching a `*` wildcard pattern.
    ///
    /// Only memory-resident keys are scanned unless the manager was
    /// configured with `pattern_scans_persistent`.
    pub async fn invalidate_pattern(&self, pattern: &str) -> usize {
        let mut keys: BTreeSet<String> = self
            .state
            .read()
            .await
            .memory
            .matching_keys(pattern)
            .into_iter()
            .collect();

        if self.pattern_scans_persistent {
            if let Some(store) = &self.store {
                match self.bounded(store.keys()).await {
                    Ok(stored) => {
                        keys.extend(stored.into_iter().filter(|k| wildcard_match(pattern, k)))
                    }
                    Err(e) => warn!(pattern, "Persistent key scan failed: {}", e),
                }
            }
        }

        let mut removed = 0;
        for key in &keys {
            let (was_resident, store_ok) = self.remove_everywhere(key).await;
            if was_resident || store_ok {
                removed += 1;
            }
        }

        info!(pattern, removed, "Invalidated cache keys by pattern");
        removed
    }

    // == Clear All ==
    /// Empties both layers and resets every counter.
    pub async fn clear_all(&self) -> bool {
        {
            let mut state = self.state.write().await;
            state.memory.clear();
            state.stats.reset();
        }

        let Some(store) = &self.store else {
            info!("Memory cache cleared");
            return true;
        };
        match self.bounded(store.clear()).await {
            Ok(()) => {
                info!("All cache layers cleared");
                true
            }
            Err(e) => {
                warn!("Persistent cache clear failed: {}", e);
                false
            }
        }
    }

    // == Preload ==
    /// Fills the cache for each key that is not already cached, one key at a
    /// time. A failing fetch only affects its own key.
    pub async fn preload(&self, entries: Vec<PreloadEntry>) -> PreloadSummary {
        let mut summary = PreloadSummary::default();

        for entry in entries {
            let (key, fetch) = entry.into_parts();

            if self.get_value(&key).await.is_some() {
                summary.cached += 1;
                continue;
            }

            match fetch().await {
                Ok(data) if is_truthy(&data) => {
                    self.set_value(&key, data, None).await;
                    summary.success += 1;
                }
                Ok(_) => {
                    debug!(key = %key, "Preload fetch returned no data");
                    summary.failed += 1;
                }
                Err(e) => {
                    warn!(key = %key, "Preload fetch failed: {:#}", e);
                    summary.failed += 1;
                }
            }
        }

        info!(
            success = summary.success,
            failed = summary.failed,
            cached = summary.cached,
            "Cache preload finished"
        );
        summary
    }

    // == Warmup ==
    /// Promotes the essential keys from the persistent layer into memory.
    ///
    /// Never fetches from the remote source. Returns false if any store read
    /// failed.
    pub async fn warmup(&self) -> bool {
        let Some(store) = &self.store else {
            debug!("Persistent layer disabled, nothing to warm up");
            return true;
        };

        let mut ok = true;
        let mut warmed = 0;

        for key in &self.essential_keys {
            match self.bounded(store.get(key)).await {
                Ok(Some(entry)) if entry.is_expired() => {
                    if let Err(e) = self.bounded(store.delete(key)).await {
                        warn!(key = %key, "Failed to delete expired persistent entry: {}", e);
                    }
                }
                Ok(Some(mut entry)) => {
                    entry.key = key.clone();
                    self.state.write().await.insert(entry);
                    warmed += 1;
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(key = %key, "Warmup read failed: {}", e);
                    ok = false;
                }
            }
        }

        info!(
            "Cache warmup promoted {} of {} essential keys",
            warmed,
            self.essential_keys.len()
        );
        ok
    }

    // == Introspection ==
    pub async fn get_stats(&self) -> CacheStatsReport {
        let state = self.state.read().await;
        CacheStatsReport::new(&state.stats, state.memory.keys())
    }

    /// Estimated memory-layer footprint from serialized entry sizes.
    pub async fn get_cache_size(&self) -> CacheSize {
        let state = self.state.read().await;
        CacheSize::new(state.memory.len(), state.memory.estimated_bytes())
    }

    pub async fn health_check(&self) -> HealthReport {
        let persistent_layer = match &self.store {
            None => PersistentLayerStatus::Disabled,
            Some(store) => match self.bounded(store.ping()).await {
                Ok(()) => PersistentLayerStatus::Reachable,
                Err(e) => {
                    warn!("Persistent store health probe failed: {}", e);
                    PersistentLayerStatus::Unreachable
                }
            },
        };

        let state = self.state.read().await;
        HealthReport::assess(state.memory.len(), persistent_layer, &state.stats)
    }

    /// Whether `key` is currently resident in the memory layer.
    pub async fn is_resident(&self, key: &str) -> bool {
        self.state.read().await.memory.contains(key)
    }

    /// Drops expired memory-layer entries without touching the counters.
    pub async fn purge_expired(&self) -> usize {
        self.state.write().await.memory.purge_expired()
    }
}

impl std::fmt::Debug for CacheManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheManager")
            .field("persistent_layer", &self.store.is_some())
            .field("default_ttl_ms", &self.default_ttl_ms)
            .field("store_timeout", &self.store_timeout)
            .finish_non_exhaustive()
    }
}
