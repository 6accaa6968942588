//! Cache Entry Module
//!
//! Defines the unit stored at both cache layers: a keyed payload with its
//! creation timestamp and time-to-live.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

// == Cache Entry ==
/// Represents a single cache entry with payload and expiry metadata.
///
/// The payload defaults to an opaque JSON value, which is how both layers
/// store it. Callers convert to and from their own types at the edges.
///
/// Missing `timestamp` or `ttl` fields deserialize as `0`, which always
/// reads as expired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T = Value> {
    /// Caller-chosen identifier
    pub key: String,
    /// The cached payload
    pub data: T,
    /// Creation timestamp (Unix milliseconds)
    #[serde(default)]
    pub timestamp: u64,
    /// Time-to-live in milliseconds
    #[serde(default)]
    pub ttl: u64,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Creates a new cache entry stamped with the current time.
    pub fn new(key: impl Into<String>, data: T, ttl_ms: u64) -> Self {
        Self {
            key: key.into(),
            data,
            timestamp: current_timestamp_ms(),
            ttl: ttl_ms,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once its age is strictly greater than its TTL.
    /// A zero TTL or a missing timestamp is expired immediately.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_ms())
    }

    /// Expiry check against an explicit clock reading.
    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        if self.ttl == 0 || self.timestamp == 0 {
            return true;
        }
        now_ms.saturating_sub(self.timestamp) > self.ttl
    }

    // == Age ==
    /// Milliseconds elapsed since the entry was written.
    pub fn age_ms(&self) -> u64 {
        current_timestamp_ms().saturating_sub(self.timestamp)
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, `0` once expired.
    pub fn ttl_remaining_ms(&self) -> u64 {
        if self.is_expired() {
            return 0;
        }
        self.ttl.saturating_sub(self.age_ms())
    }
}

impl CacheEntry<Value> {
    /// Encodes a typed payload into a storable entry.
    pub fn from_typed<T: Serialize>(key: impl Into<String>, data: &T, ttl_ms: u64) -> Result<Self> {
        Ok(Self::new(key, serde_json::to_value(data)?, ttl_ms))
    }

    /// Decodes the payload into the caller's type, keeping the metadata.
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<CacheEntry<T>> {
        Ok(CacheEntry {
            key: self.key,
            data: serde_json::from_value(self.data)?,
            timestamp: self.timestamp,
            ttl: self.ttl,
        })
    }

    /// Serialized size in bytes, used as a memory footprint estimate.
    pub fn estimated_size(&self) -> usize {
        serde_json::to_vec(self).map(|bytes| bytes.len()).unwrap_or(0)
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
///
/// A clock set before the epoch reads as `0`.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
