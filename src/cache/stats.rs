//! Cache Statistics Module
//!
//! Tracks per-layer hits, misses, writes and invalidations.

use serde::Serialize;

// == Cache Stats ==
/// Process-lifetime cache counters. Only `clear_all` resets them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Lookups answered by the memory layer
    pub memory_hits: u64,
    /// Lookups answered by the persistent layer
    pub persistent_hits: u64,
    /// Lookups that found no valid entry
    pub misses: u64,
    /// Successful memory-layer writes
    pub sets: u64,
    /// Explicit invalidations
    pub invalidations: u64,
    /// Entries evicted from the memory layer by the LRU policy
    pub evictions: u64,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total lookups recorded.
    pub fn total_requests(&self) -> u64 {
        self.memory_hits + self.persistent_hits + self.misses
    }

    // == Hit Rate ==
    /// Hit rate as a percentage of all lookups, `0.0` with no lookups.
    pub fn hit_rate(&self) -> f64 {
        let total = self.total_requests();
        if total == 0 {
            0.0
        } else {
            (self.memory_hits + self.persistent_hits) as f64 / total as f64 * 100.0
        }
    }

    pub fn record_memory_hit(&mut self) {
        self.memory_hits += 1;
    }

    pub fn record_persistent_hit(&mut self) {
        self.persistent_hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_set(&mut self) {
        self.sets += 1;
    }

    pub fn record_invalidation(&mut self) {
        self.invalidations += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    /// Zeroes every counter.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// == Stats Report ==
/// Snapshot returned by `CacheManager::get_stats`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStatsReport {
    pub memory_hits: u64,
    pub persistent_hits: u64,
    pub misses: u64,
    pub sets: u64,
    pub invalidations: u64,
    pub evictions: u64,
    pub total_requests: u64,
    /// Percentage of lookups served by either layer
    pub hit_rate: f64,
    /// Entries currently resident in the memory layer
    pub memory_cache_size: usize,
    /// Resident keys, sorted
    pub memory_keys: Vec<String>,
}

impl CacheStatsReport {
    pub fn new(stats: &CacheStats, mut memory_keys: Vec<String>) -> Self {
        memory_keys.sort();
        Self {
            memory_hits: stats.memory_hits,
            persistent_hits: stats.persistent_hits,
            misses: stats.misses,
            sets: stats.sets,
            invalidations: stats.invalidations,
            evictions: stats.evictions,
            total_requests: stats.total_requests(),
            hit_rate: stats.hit_rate(),
            memory_cache_size: memory_keys.len(),
            memory_keys,
        }
    }
}

// == Cache Size ==
/// Rough memory footprint of the memory layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheSize {
    pub items: usize,
    /// Sum of serialized entry sizes
    pub bytes: usize,
    pub kilobytes: f64,
}

impl CacheSize {
    pub fn new(items: usize, bytes: usize) -> Self {
        Self {
            items,
            bytes,
            kilobytes: (bytes as f64 / 1024.0 * 100.0).round() / 100.0,
        }
    }
}
