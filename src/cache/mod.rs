//! Cache Module
//!
//! Two-layer caching: a bounded in-memory layer with TTL expiration and LRU
//! eviction in front of a durable persistent store.

mod entry;
mod health;
mod lru;
mod manager;
mod memory;
mod pattern;
mod preload;
mod stats;


// Re-export public types
pub use entry::{current_timestamp_ms, CacheEntry};
pub use health::{HealthReport, HealthStatus, PersistentLayerStatus};
pub use lru::{AccessStamp, AccessTracker};
pub use manager::CacheManager;
pub use memory::{Lookup, MemoryLayer};
pub use pattern::wildcard_match;
pub use preload::{is_truthy, FetchFuture, PreloadEntry, PreloadSummary};
pub use stats::{CacheSize, CacheStats, CacheStatsReport};

use crate::error::{CacheError, Result};

// == Public Constants ==
/// Default time-to-live: 30 minutes
pub const DEFAULT_TTL_MS: u64 = 30 * 60 * 1000;

/// Default memory layer capacity
pub const DEFAULT_MAX_MEMORY_ITEMS: usize = 100;

/// Rejects the empty key. Any other string is a valid key.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::InvalidRequest("Key cannot be empty".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_key() {
        assert!(validate_key("matches").is_ok());
        assert!(validate_key(&"k".repeat(4096)).is_ok());
        assert!(matches!(
            validate_key(""),
            Err(CacheError::InvalidRequest(_))
        ));
    }
}
