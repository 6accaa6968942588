//! Response DTOs for the cache service API
//!
//! Defines the structure of outgoing HTTP response bodies. Stats, size and
//! health reports are serialized straight from the cache types.

use serde::Serialize;
use serde_json::Value;

/// Response body for GET /cache/:key
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    pub key: String,
    pub data: Value,
}

impl GetResponse {
    pub fn new(key: impl Into<String>, data: Value) -> Self {
        Self {
            key: key.into(),
            data,
        }
    }
}

/// Response body for key-level writes (PUT and DELETE /cache/:key)
///
/// `success` is false when the persistent layer could not be updated; the
/// memory layer has still been changed.
#[derive(Debug, Clone, Serialize)]
pub struct KeyResponse {
    pub key: String,
    pub success: bool,
}

impl KeyResponse {
    pub fn new(key: impl Into<String>, success: bool) -> Self {
        Self {
            key: key.into(),
            success,
        }
    }
}

/// Response body for DELETE /cache?pattern=...
#[derive(Debug, Clone, Serialize)]
pub struct PatternResponse {
    pub pattern: String,
    /// Number of keys invalidated
    pub removed: usize,
}

impl PatternResponse {
    pub fn new(pattern: impl Into<String>, removed: usize) -> Self {
        Self {
            pattern: pattern.into(),
            removed,
        }
    }
}

/// Response body for whole-cache operations (clear, warmup)
#[derive(Debug, Clone, Serialize)]
pub struct OperationResponse {
    pub operation: String,
    pub success: bool,
}

impl OperationResponse {
    pub fn new(operation: impl Into<String>, success: bool) -> Self {
        Self {
            operation: operation.into(),
            success,
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
