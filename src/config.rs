//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;
use std::path::PathBuf;

use crate::cache::{DEFAULT_MAX_MEMORY_ITEMS, DEFAULT_TTL_MS};

/// Keys warmed from the persistent layer at startup.
pub const DEFAULT_ESSENTIAL_KEYS: &[&str] =
    &["matches", "players", "teams", "penalty_shootouts", "goalkeepers"];

/// Cache and server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Default TTL in milliseconds for entries set without an explicit TTL
    pub default_ttl_ms: u64,
    /// Maximum number of entries resident in the memory layer
    pub max_memory_items: usize,
    /// Whether the persistent layer is consulted at all
    pub use_persistent_layer: bool,
    /// Whether pattern invalidation also scans persistent-only keys
    pub pattern_scans_persistent: bool,
    /// Root directory of the file-backed persistent store
    pub store_dir: PathBuf,
    /// Upper bound on a single persistent store call, in milliseconds
    pub store_timeout_ms: u64,
    /// Keys promoted from the persistent layer by `warmup`
    pub essential_keys: Vec<String>,
    /// HTTP server port
    pub server_port: u16,
    /// Background sweep interval in seconds
    pub sweep_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `DEFAULT_TTL_MS` - Default TTL in milliseconds (default: 1800000)
    /// - `MAX_MEMORY_ITEMS` - Memory layer capacity (default: 100)
    /// - `USE_PERSISTENT_LAYER` - Enable the persistent layer (default: true)
    /// - `PATTERN_SCANS_PERSISTENT` - Pattern invalidation scans the store too (default: false)
    /// - `CACHE_STORE_DIR` - Persistent store directory (default: ./data/cache)
    /// - `STORE_TIMEOUT_MS` - Persistent store call timeout (default: 2000)
    /// - `ESSENTIAL_KEYS` - Comma separated warmup keys
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `SWEEP_INTERVAL` - Expired entry sweep frequency in seconds (default: 60)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            default_ttl_ms: parse_var("DEFAULT_TTL_MS").unwrap_or(defaults.default_ttl_ms),
            max_memory_items: parse_var("MAX_MEMORY_ITEMS").unwrap_or(defaults.max_memory_items),
            use_persistent_layer: parse_var("USE_PERSISTENT_LAYER")
                .unwrap_or(defaults.use_persistent_layer),
            pattern_scans_persistent: parse_var("PATTERN_SCANS_PERSISTENT")
                .unwrap_or(defaults.pattern_scans_persistent),
            store_dir: env::var("CACHE_STORE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.store_dir),
            store_timeout_ms: parse_var("STORE_TIMEOUT_MS").unwrap_or(defaults.store_timeout_ms),
            essential_keys: env::var("ESSENTIAL_KEYS")
                .ok()
                .map(|v| parse_key_list(&v))
                .unwrap_or(defaults.essential_keys),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            sweep_interval: parse_var("SWEEP_INTERVAL").unwrap_or(defaults.sweep_interval),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_ttl_ms: DEFAULT_TTL_MS,
            max_memory_items: DEFAULT_MAX_MEMORY_ITEMS,
            use_persistent_layer: true,
            pattern_scans_persistent: false,
            store_dir: PathBuf::from("./data/cache"),
            store_timeout_ms: 2_000,
            essential_keys: DEFAULT_ESSENTIAL_KEYS.iter().map(|k| k.to_string()).collect(),
            server_port: 3000,
            sweep_interval: 60,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

fn parse_key_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.default_ttl_ms, 1_800_000);
        assert_eq!(config.max_memory_items, 100);
        assert!(config.use_persistent_layer);
        assert!(!config.pattern_scans_persistent);
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.essential_keys.len(), DEFAULT_ESSENTIAL_KEYS.len());
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("DEFAULT_TTL_MS");
        env::remove_var("MAX_MEMORY_ITEMS");
        env::remove_var("USE_PERSISTENT_LAYER");
        env::remove_var("ESSENTIAL_KEYS");

        let config = Config::from_env();
        assert_eq!(config.default_ttl_ms, 1_800_000);
        assert_eq!(config.max_memory_items, 100);
        assert!(config.use_persistent_layer);
        assert_eq!(config.essential_keys[0], "matches");
    }

    #[test]
    fn test_parse_key_list_skips_blanks() {
        let keys = parse_key_list(" matches, ,players,,teams ");
        assert_eq!(keys, vec!["matches", "players", "teams"]);
    }
}
