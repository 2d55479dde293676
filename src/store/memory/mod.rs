//! In-Memory Store Module
//!
//! A `StoreClient` living in process memory, with absolute-time expiration
//! and LRU eviction. Usable as a local backend or as a substitute for a
//! remote store in tests.

mod entry;
mod lru;
mod stats;

use std::collections::{HashMap, HashSet};
use std::convert::Infallible;

use parking_lot::Mutex;
use tracing::debug;

use crate::config::Config;
use crate::store::{StoreClient, StoreStatus};

pub use entry::{current_timestamp_ms, StoreEntry};
use lru::LruTracker;
pub use stats::CacheStats;

// == Public Constants ==
/// Default maximum number of entries
pub const DEFAULT_MAX_ENTRIES: usize = 1000;

/// Default maximum value size in bytes
pub const DEFAULT_MAX_VALUE_SIZE: usize = 1024 * 1024; // 1 MB

// == Memory Store Config ==
/// Limits and defaults for a `MemoryStore`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryStoreConfig {
    /// Maximum number of entries before LRU eviction kicks in
    pub max_entries: usize,
    /// Expiration in seconds applied to every plain write, None = never
    pub default_ttl: Option<u64>,
    /// Largest value accepted by `set`, in bytes
    pub max_value_size: usize,
}

impl Default for MemoryStoreConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            default_ttl: None,
            max_value_size: DEFAULT_MAX_VALUE_SIZE,
        }
    }
}

impl From<&Config> for MemoryStoreConfig {
    fn from(config: &Config) -> Self {
        Self {
            max_entries: config.max_entries,
            default_ttl: config.default_ttl,
            max_value_size: config.max_value_size,
        }
    }
}

// == Store State ==
/// Everything guarded by the store's lock.
#[derive(Debug, Default)]
struct StoreState {
    entries: HashMap<String, StoreEntry>,
    lru: LruTracker,
    stats: CacheStats,
}

impl StoreState {
    /// Drops `key` if it has expired. Returns true if a live entry remains.
    fn purge_if_expired(&mut self, key: &str) -> bool {
        match self.entries.get(key) {
            Some(entry) if entry.is_expired() => {
                self.remove(key);
                self.stats.record_expirations(1);
                false
            }
            Some(_) => true,
            None => false,
        }
    }

    fn remove(&mut self, key: &str) -> Option<StoreEntry> {
        let removed = self.entries.remove(key);
        if removed.is_some() {
            self.lru.remove(key);
            self.stats.set_total_entries(self.entries.len());
        }
        removed
    }

    fn sweep_expired(&mut self) -> usize {
        let now = current_timestamp_ms();
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.remove(key);
        }
        self.stats.record_expirations(expired.len());
        expired.len()
    }
}

// == Memory Store ==
/// Thread-safe in-memory store implementing `StoreClient`.
///
/// Behaves like a remote key-value server for the operations the cache
/// facade uses:
/// - `set` replaces the value and drops any previous expiration, then
///   applies `default_ttl` if configured
/// - `set` answers with a non-OK status instead of failing when the value is
///   too large or no room can be made
/// - expired entries are invisible and removed lazily or by
///   `cleanup_expired`
#[derive(Debug)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
    config: MemoryStoreConfig,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates an empty store with the given limits.
    pub fn new(config: MemoryStoreConfig) -> Self {
        Self {
            state: Mutex::new(StoreState::default()),
            config,
        }
    }

    // == TTL ==
    /// Remaining time to live of `key` in whole seconds.
    ///
    /// Returns None when the key is absent or has no expiration.
    pub fn ttl(&self, key: &str) -> Option<u64> {
        let mut state = self.state.lock();
        if !state.purge_if_expired(key) {
            return None;
        }
        state.entries.get(key).and_then(StoreEntry::ttl_remaining)
    }

    // == Stats ==
    /// Returns a snapshot of the store counters.
    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        let mut stats = state.stats.clone();
        stats.set_total_entries(state.entries.len());
        stats
    }

    // == Cleanup Expired ==
    /// Removes all expired entries, returning how many were removed.
    pub fn cleanup_expired(&self) -> usize {
        self.state.lock().sweep_expired()
    }

    /// Number of entries held, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }

    /// Finds room for one new entry, sweeping expired entries first and then
    /// evicting the least recently used one. Returns false if no room exists.
    fn make_room(&self, state: &mut StoreState) -> bool {
        if state.entries.len() < self.config.max_entries {
            return true;
        }

        state.sweep_expired();
        if state.entries.len() < self.config.max_entries {
            return true;
        }

        match state.lru.evict_oldest() {
            Some(evicted) => {
                state.entries.remove(&evicted);
                state.stats.record_eviction();
                debug!(key = %evicted, "Evicted least recently used entry");
                true
            }
            None => false,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(MemoryStoreConfig::default())
    }
}

// == Store Client Implementation ==
impl StoreClient for MemoryStore {
    type Error = Infallible;

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, Self::Error> {
        let mut state = self.state.lock();

        if !state.purge_if_expired(key) {
            state.stats.record_miss();
            return Ok(None);
        }

        let value = state.entries.get(key).map(|entry| entry.value.clone());
        state.stats.record_hit();
        state.lru.touch(key);
        Ok(value)
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<StoreStatus, Self::Error> {
        let mut state = self.state.lock();

        if value.len() > self.config.max_value_size {
            state.stats.record_refused_write();
            return Ok(StoreStatus::new(format!(
                "ERR value exceeds maximum size of {} bytes",
                self.config.max_value_size
            )));
        }

        let is_overwrite = state.purge_if_expired(key);
        if !is_overwrite && !self.make_room(&mut state) {
            state.stats.record_refused_write();
            return Ok(StoreStatus::new("OOM store has no room for new entries"));
        }

        let entry = StoreEntry::new(value.to_vec(), self.config.default_ttl);
        state.entries.insert(key.to_string(), entry);
        state.lru.touch(key);
        let total = state.entries.len();
        state.stats.set_total_entries(total);

        Ok(StoreStatus::ok())
    }

    fn del(&self, keys: &[&str]) -> Result<usize, Self::Error> {
        let mut state = self.state.lock();
        let unique: HashSet<&str> = keys.iter().copied().collect();

        let removed = unique
            .into_iter()
            .filter(|key| state.purge_if_expired(key) && state.remove(key).is_some())
            .count();

        Ok(removed)
    }

    fn exists(&self, key: &str) -> Result<usize, Self::Error> {
        let mut state = self.state.lock();
        Ok(usize::from(state.purge_if_expired(key)))
    }

    fn expire_at(&self, key: &str, timestamp: i64) -> Result<bool, Self::Error> {
        let mut state = self.state.lock();

        if !state.purge_if_expired(key) {
            return Ok(false);
        }

        if let Some(entry) = state.entries.get_mut(key) {
            entry.expire_at(timestamp);
        }
        // An instant in the past removes the key right away
        state.purge_if_expired(key);

        Ok(true)
    }

    fn flush_all(&self) -> Result<(), Self::Error> {
        let mut state = self.state.lock();
        let flushed = state.entries.len();

        state.entries.clear();
        state.lru.clear();
        state.stats.set_total_entries(0);

        debug!(flushed, "Flushed in-memory store");
        Ok(())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    fn store_with(max_entries: usize) -> MemoryStore {
        MemoryStore::new(MemoryStoreConfig {
            max_entries,
            ..MemoryStoreConfig::default()
        })
    }

    fn now_secs() -> i64 {
        (current_timestamp_ms() / 1000) as i64
    }

    #[test]
    fn test_store_new() {
        let store = MemoryStore::default();
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_set_and_get() {
        let store = MemoryStore::default();

        let status = store.set("key1", b"value1").unwrap();
        assert!(status.is_ok());

        assert_eq!(store.get("key1").unwrap(), Some(b"value1".to_vec()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let store = MemoryStore::default();
        assert_eq!(store.get("nonexistent").unwrap(), None);
    }

    #[test]
    fn test_store_overwrite_clears_expiration() {
        let store = MemoryStore::default();

        store.set("key1", b"value1").unwrap();
        assert!(store.expire_at("key1", now_secs() + 60).unwrap());
        assert!(store.ttl("key1").is_some());

        store.set("key1", b"value2").unwrap();

        assert_eq!(store.get("key1").unwrap(), Some(b"value2".to_vec()));
        assert_eq!(store.ttl("key1"), None);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_default_ttl() {
        let store = MemoryStore::new(MemoryStoreConfig {
            default_ttl: Some(30),
            ..MemoryStoreConfig::default()
        });

        store.set("key1", b"value1").unwrap();

        let ttl = store.ttl("key1").unwrap();
        assert!(ttl <= 30 && ttl >= 29);
    }

    #[test]
    fn test_store_del_counts_removed_keys() {
        let store = MemoryStore::default();

        store.set("a", b"1").unwrap();
        store.set("b", b"2").unwrap();

        assert_eq!(store.del(&["a", "missing"]).unwrap(), 1);
        assert_eq!(store.del(&["b", "b"]).unwrap(), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_exists() {
        let store = MemoryStore::default();

        store.set("key1", b"value1").unwrap();

        assert_eq!(store.exists("key1").unwrap(), 1);
        assert_eq!(store.exists("key2").unwrap(), 0);
    }

    #[test]
    fn test_store_expire_at() {
        let store = MemoryStore::default();

        store.set("key1", b"value1").unwrap();
        assert!(store.expire_at("key1", now_secs() + 3600).unwrap());

        let ttl = store.ttl("key1").unwrap();
        assert!(ttl >= 3598 && ttl <= 3600, "ttl was {ttl}");
    }

    #[test]
    fn test_store_expire_at_missing_key() {
        let store = MemoryStore::default();
        assert!(!store.expire_at("missing", now_secs() + 60).unwrap());
    }

    #[test]
    fn test_store_expire_at_past_removes_key() {
        let store = MemoryStore::default();

        store.set("key1", b"value1").unwrap();
        assert!(store.expire_at("key1", now_secs() - 1).unwrap());

        assert_eq!(store.exists("key1").unwrap(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_ttl_expiration() {
        let store = MemoryStore::default();

        store.set("key1", b"value1").unwrap();
        store.expire_at("key1", now_secs() + 1).unwrap();

        sleep(Duration::from_millis(2100));

        assert_eq!(store.get("key1").unwrap(), None);
        assert_eq!(store.stats().expirations, 1);
    }

    #[test]
    fn test_store_flush_all() {
        let store = MemoryStore::default();

        store.set("a", b"1").unwrap();
        store.set("b", b"2").unwrap();
        store.flush_all().unwrap();

        assert!(store.is_empty());
        assert_eq!(store.get("a").unwrap(), None);
    }

    #[test]
    fn test_store_lru_eviction() {
        let store = store_with(3);

        store.set("key1", b"value1").unwrap();
        store.set("key2", b"value2").unwrap();
        store.set("key3", b"value3").unwrap();

        // Access key1 so key2 becomes the eviction candidate
        store.get("key1").unwrap();
        store.set("key4", b"value4").unwrap();

        assert_eq!(store.len(), 3);
        assert_eq!(store.get("key2").unwrap(), None);
        assert!(store.get("key1").unwrap().is_some());
        assert!(store.get("key4").unwrap().is_some());
        assert_eq!(store.stats().evictions, 1);
    }

    #[test]
    fn test_store_full_without_room_refuses() {
        let store = store_with(0);

        let status = store.set("key1", b"value1").unwrap();

        assert!(!status.is_ok());
        assert!(store.is_empty());
        assert_eq!(store.stats().refused_writes, 1);
    }

    #[test]
    fn test_store_value_too_large_refused() {
        let store = MemoryStore::new(MemoryStoreConfig {
            max_value_size: 4,
            ..MemoryStoreConfig::default()
        });

        let status = store.set("key1", b"too large").unwrap();

        assert!(!status.is_ok());
        assert!(status.payload().starts_with("ERR"));
        assert_eq!(store.get("key1").unwrap(), None);
    }

    #[test]
    fn test_store_stats() {
        let store = MemoryStore::default();

        store.set("key1", b"value1").unwrap();
        store.get("key1").unwrap();
        store.get("nonexistent").unwrap();

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 1);
    }

    #[test]
    fn test_store_cleanup_expired() {
        let store = MemoryStore::default();

        store.set("key1", b"value1").unwrap();
        store.set("key2", b"value2").unwrap();
        store.expire_at("key1", now_secs() + 1).unwrap();
        store.expire_at("key2", now_secs() + 60).unwrap();

        sleep(Duration::from_millis(2100));

        assert_eq!(store.cleanup_expired(), 1);
        assert_eq!(store.len(), 1);
        assert!(store.get("key2").unwrap().is_some());
    }
}
