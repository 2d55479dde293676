//! Store Entry Module
//!
//! Defines the structure for individual stored values with expiration support.

use std::time::{SystemTime, UNIX_EPOCH};

// == Store Entry ==
/// A raw value held by the in-memory store, with its metadata.
#[derive(Debug, Clone)]
pub struct StoreEntry {
    /// The stored bytes
    pub value: Vec<u8>,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    pub expires_at: Option<u64>,
}

impl StoreEntry {
    // == Constructor ==
    /// Creates a new entry with an optional relative TTL.
    ///
    /// # Arguments
    /// * `value` - The bytes to store
    /// * `ttl_seconds` - Optional TTL in seconds
    pub fn new(value: Vec<u8>, ttl_seconds: Option<u64>) -> Self {
        let now = current_timestamp_ms();
        let expires_at = ttl_seconds.map(|ttl| now.saturating_add(ttl.saturating_mul(1000)));

        Self {
            value,
            created_at: now,
            expires_at,
        }
    }

    // == Expire At ==
    /// Replaces the expiration with an absolute Unix timestamp in seconds.
    ///
    /// Timestamps before the epoch are clamped to it, which expires the entry.
    pub fn expire_at(&mut self, timestamp_secs: i64) {
        let secs = u64::try_from(timestamp_secs).unwrap_or(0);
        self.expires_at = Some(secs.saturating_mul(1000));
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current time is greater than or equal to
    /// its expiration time.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_ms())
    }

    /// Same as `is_expired`, evaluated at `now_ms`.
    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        match self.expires_at {
            Some(expires) => now_ms >= expires,
            None => false,
        }
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, or None if no expiration is set.
    ///
    /// # Returns
    /// - `Some(0)` if the entry has expired
    /// - `Some(remaining_ms)` if the entry has TTL and hasn't expired
    /// - `None` if the entry never expires
    pub fn ttl_remaining_ms(&self) -> Option<u64> {
        self.expires_at
            .map(|expires| expires.saturating_sub(current_timestamp_ms()))
    }

    /// Returns remaining TTL in whole seconds, or None if no expiration is set.
    pub fn ttl_remaining(&self) -> Option<u64> {
        self.ttl_remaining_ms().map(|ms| ms / 1000)
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
