//! Store Statistics Module
//!
//! Counters describing how the in-memory store has been used.

use serde::Serialize;

// == Cache Stats ==
/// Performance counters for the in-memory store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Reads that found a live value
    pub hits: u64,
    /// Reads that found nothing (absent or expired)
    pub misses: u64,
    /// Entries dropped by the LRU policy to make room
    pub evictions: u64,
    /// Entries dropped because their expiration passed
    pub expirations: u64,
    /// Writes answered with a non-OK status
    pub refused_writes: u64,
    /// Current number of entries, including not yet swept expired ones
    pub total_entries: usize,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 before the first read.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_expirations(&mut self, count: usize) {
        self.expirations += count as u64;
    }

    pub fn record_refused_write(&mut self) {
        self.refused_writes += 1;
    }

    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}
