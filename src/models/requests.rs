//! Request DTOs for the cache service API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;
use serde_json::Value;

use crate::cache::validate_key;

/// Request body for the SET operation (PUT /cache/:key)
///
/// # Fields
/// - `data`: The JSON payload to cache; required, any JSON value including `null`
/// - `ttl`: Optional TTL in milliseconds (uses the default if not specified)
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// The payload to store
    pub data: Value,
    /// Optional TTL in milliseconds
    #[serde(default)]
    pub ttl: Option<u64>,
}

impl SetRequest {
    /// Validates the request against the key it targets.
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self, key: &str) -> Option<String> {
        validate_key(key).err().map(|e| e.to_string())
    }
}

/// Query string for pattern invalidation (DELETE /cache?pattern=...)
#[derive(Debug, Clone, Deserialize)]
pub struct PatternQuery {
    pub pattern: String,
}
