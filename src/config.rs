//! Configuration Module
//!
//! Handles loading store and demo configuration from environment variables.

use std::env;

use crate::store::memory::{DEFAULT_MAX_ENTRIES, DEFAULT_MAX_VALUE_SIZE};

/// Runtime configuration.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Redis URL; None selects the in-memory store
    pub store_url: Option<String>,
    /// Maximum number of entries the in-memory store can hold
    pub max_entries: usize,
    /// Expiration in seconds the in-memory store applies to plain writes
    pub default_ttl: Option<u64>,
    /// Largest value the in-memory store accepts, in bytes
    pub max_value_size: usize,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `STORE_URL` - Redis URL, e.g. `redis://localhost:6379` (default: unset, in-memory store)
    /// - `MAX_ENTRIES` - Maximum in-memory entries (default: 1000)
    /// - `DEFAULT_TTL` - Default in-memory TTL in seconds, 0 = none (default: none)
    /// - `MAX_VALUE_SIZE` - Maximum in-memory value size in bytes (default: 1 MiB)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 1)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            store_url: env::var("STORE_URL").ok().filter(|url| !url.trim().is_empty()),
            max_entries: parse_var("MAX_ENTRIES").unwrap_or(defaults.max_entries),
            default_ttl: parse_var("DEFAULT_TTL")
                .filter(|ttl| *ttl > 0)
                .or(defaults.default_ttl),
            max_value_size: parse_var("MAX_VALUE_SIZE").unwrap_or(defaults.max_value_size),
            cleanup_interval: parse_var("CLEANUP_INTERVAL")
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.cleanup_interval),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_url: None,
            max_entries: DEFAULT_MAX_ENTRIES,
            default_ttl: None,
            max_value_size: DEFAULT_MAX_VALUE_SIZE,
            cleanup_interval: 1,
        }
    }
}
