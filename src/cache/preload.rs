//! Startup preloading of cache keys from caller-supplied fetchers.

use std::future::Future;
use std::pin::Pin;

use serde::Serialize;
use serde_json::Value;

/// Future produced by a preload fetcher.
pub type FetchFuture = Pin<Box<dyn Future<Output = anyhow::Result<Value>> + Send>>;

type FetchFn = Box<dyn FnOnce() -> FetchFuture + Send>;

// == Preload Entry ==
/// A key paired with the fetch that produces its fresh value on a miss.
pub struct PreloadEntry {
    pub key: String,
    fetch: FetchFn,
}

impl PreloadEntry {
    pub fn new<F, Fut>(key: impl Into<String>, fetch: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        Self {
            key: key.into(),
            fetch: Box::new(move || Box::pin(fetch())),
        }
    }

    pub(crate) fn into_parts(self) -> (String, FetchFn) {
        (self.key, self.fetch)
    }
}

impl std::fmt::Debug for PreloadEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreloadEntry")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

// == Preload Summary ==
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PreloadSummary {
    /// Fetched and stored
    pub success: usize,
    /// Fetch failed or produced nothing usable
    pub failed: usize,
    /// Already cached, fetch skipped
    pub cached: usize,
}

/// Whether a fetched value counts as data.
///
/// `null`, `false`, zero and the empty string do not; arrays and objects
/// always do, even when empty.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
