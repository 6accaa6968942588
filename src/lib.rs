//! Match Cache - a two-layer cache for football statistics data
//!
//! A bounded in-memory layer with TTL expiration and LRU eviction sits in
//! front of a durable persistent layer. Reads fall through to the persistent
//! layer and promote hits; writes go to both. Cache failures never reach
//! callers.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod persistence;
pub mod tasks;

pub use api::{create_router, AppState};
pub use cache::{CacheManager, PreloadEntry, PreloadSummary};
pub use config::Config;
pub use error::{CacheError, Result};
pub use persistence::{FileStore, InMemoryStore, PersistentStore};
pub use tasks::spawn_sweep_task;
