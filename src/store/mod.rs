//! Store Module
//!
//! The narrow client contract the cache facade needs from a key-value store,
//! plus the bundled client implementations.

pub mod memory;
#[cfg(feature = "redis")]
pub mod redis;

use std::error::Error as StdError;
use std::fmt;

pub use memory::{CacheStats, MemoryStore, MemoryStoreConfig};
#[cfg(feature = "redis")]
pub use self::redis::RedisStore;

// == Store Status ==
/// Status reply returned by a store write.
///
/// Stores acknowledge a successful plain write with the canonical `OK`
/// status; anything else means the write was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStatus(String);

impl StoreStatus {
    /// The canonical success payload.
    pub const OK: &'static str = "OK";

    /// Creates a status from its raw payload.
    pub fn new(payload: impl Into<String>) -> Self {
        Self(payload.into())
    }

    /// The canonical success status.
    pub fn ok() -> Self {
        Self::new(Self::OK)
    }

    /// Raw status payload as sent by the store.
    pub fn payload(&self) -> &str {
        &self.0
    }

    /// Returns true only for the canonical `OK` payload.
    pub fn is_ok(&self) -> bool {
        self.0 == Self::OK
    }
}

impl fmt::Display for StoreStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// == Store Client Trait ==
/// Minimal capability set of a key-value store client.
///
/// Keys and values are byte strings; the facade never hands unserialized
/// data to a client. Implementations own their connection lifecycle and
/// any timeout or retry policy.
pub trait StoreClient {
    /// Error reported for transport or protocol failures.
    type Error: StdError + Send + Sync + 'static;

    /// Reads the raw value stored under `key`, or None when absent.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Writes `value` under `key`, returning the store's status reply.
    fn set(&self, key: &str, value: &[u8]) -> Result<StoreStatus, Self::Error>;

    /// Removes `keys`, returning how many keys were actually removed.
    fn del(&self, keys: &[&str]) -> Result<usize, Self::Error>;

    /// Returns the number of the given key that exist (0 or 1).
    fn exists(&self, key: &str) -> Result<usize, Self::Error>;

    /// Sets an absolute expiration for `key` as a unix timestamp in seconds.
    /// Returns false when the key does not exist.
    fn expire_at(&self, key: &str, timestamp: i64) -> Result<bool, Self::Error>;

    /// Removes every key in the store's active namespace.
    fn flush_all(&self) -> Result<(), Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_ok() {
        assert!(StoreStatus::ok().is_ok());
        assert_eq!(StoreStatus::ok().payload(), "OK");
    }

    #[test]
    fn test_status_not_ok() {
        assert!(!StoreStatus::new("Not OK").is_ok());
        assert!(!StoreStatus::new("ok").is_ok());
        assert!(!StoreStatus::new("").is_ok());
    }
}
