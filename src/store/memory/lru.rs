//! LRU Tracker Module
//!
//! Least Recently Used ordering for in-memory store eviction.

use std::collections::{BTreeMap, HashMap};

// == LRU Tracker ==
/// Tracks key access order for LRU eviction.
///
/// Every touch stamps the key with a monotonically increasing tick, so the
/// smallest tick is always the least recently used key.
#[derive(Debug, Default)]
pub struct LruTracker {
    /// Tick -> key, ordered oldest first
    order: BTreeMap<u64, String>,
    /// Key -> tick of its last access
    ticks: HashMap<String, u64>,
    /// Next tick to hand out
    clock: u64,
}

impl LruTracker {
    // == Touch ==
    /// Marks a key as most recently used, tracking it if it is new.
    pub fn touch(&mut self, key: &str) {
        self.clock += 1;
        let tick = self.clock;

        match self.ticks.get_mut(key) {
            Some(previous) => {
                if let Some(name) = self.order.remove(previous) {
                    self.order.insert(tick, name);
                }
                *previous = tick;
            }
            None => {
                self.order.insert(tick, key.to_string());
                self.ticks.insert(key.to_string(), tick);
            }
        }
    }

    // == Remove ==
    /// Stops tracking a key. Unknown keys are ignored.
    pub fn remove(&mut self, key: &str) {
        if let Some(tick) = self.ticks.remove(key) {
            self.order.remove(&tick);
        }
    }

    // == Evict Oldest ==
    /// Returns and removes the least recently used key.
    pub fn evict_oldest(&mut self) -> Option<String> {
        let (_, key) = self.order.pop_first()?;
        self.ticks.remove(&key);
        Some(key)
    }

    /// Forgets every tracked key.
    pub fn clear(&mut self) {
        self.order.clear();
        self.ticks.clear();
    }
}
