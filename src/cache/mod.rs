//! Cache Module
//!
//! The simple-cache interface and its implementation over a `StoreClient`.

mod facade;


use std::collections::HashMap;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::Result;
use crate::ttl::Ttl;

pub use facade::StoreCache;

// == Simple Cache Trait ==
/// The simple-cache interface: single-key get/set/delete/has, whole-cache
/// clear, and `*_multiple` batch variants keyed by string.
///
/// Every key is validated before the store is contacted. Validation and
/// serialization problems are returned as errors; a write the store refuses
/// is reported as `Ok(false)`.
pub trait SimpleCache {
    /// Fetches the value stored under `key`, or None on a cache miss.
    fn get<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned;

    /// Fetches the value stored under `key`, or returns `default` unchanged
    /// on a cache miss.
    fn get_or<T>(&self, key: &str, default: T) -> Result<T>
    where
        T: DeserializeOwned;

    /// Fetches several keys, one independent read per key.
    ///
    /// The result holds one entry per distinct key; misses map to a clone of
    /// `default`.
    fn get_multiple<T, I, K>(&self, keys: I, default: T) -> Result<HashMap<String, T>>
    where
        T: DeserializeOwned + Clone,
        I: IntoIterator<Item = K>,
        K: AsRef<str>;

    /// Stores `value` under `key` with an optional TTL.
    ///
    /// Returns false when the store refuses the write, in which case no
    /// expiration is applied.
    fn set<V>(&self, key: &str, value: &V, ttl: Option<Ttl>) -> Result<bool>
    where
        V: Serialize + ?Sized;

    /// Stores every pair in order, sharing one TTL.
    ///
    /// Stops at the first refused write and returns false; earlier writes are
    /// kept.
    fn set_multiple<I, K, V>(&self, values: I, ttl: Option<Ttl>) -> Result<bool>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Serialize;

    /// Deletes `key`. Returns true only if the key existed and was removed.
    fn delete(&self, key: &str) -> Result<bool>;

    /// Deletes `keys` in one request. Returns true only if the store removed
    /// exactly as many keys as were requested.
    fn delete_multiple<I, K>(&self, keys: I) -> Result<bool>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>;

    /// Removes every key in the store, not only keys written by this cache.
    fn clear(&self) -> Result<bool>;

    /// Reports whether `key` currently exists.
    ///
    /// The answer may be stale by the time the caller acts on it: another
    /// client can remove or add the key in between. Use it for cache warming,
    /// never as a guard around `get`/`set`.
    fn has(&self, key: &str) -> Result<bool>;
}
