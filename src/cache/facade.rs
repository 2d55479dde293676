//! Store Cache Module
//!
//! `SimpleCache` over any `StoreClient`, with values passed through a
//! pluggable `Serializer`.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use crate::cache::SimpleCache;
use crate::error::{CacheError, Result};
use crate::serializer::{JsonSerializer, Serializer};
use crate::store::StoreClient;
use crate::ttl::Ttl;
use crate::validation::{validate_key, validate_ttl};

// == Store Cache ==
/// Cache facade over a shared store client.
///
/// The facade holds no state of its own besides the client handle and the
/// serializer; every call is a synchronous sequence of store round trips.
/// It never closes or reconfigures the client, which may be shared with
/// other facades or code.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use store_cache::{MemoryStore, SimpleCache, StoreCache, Ttl};
///
/// let cache = StoreCache::new(Arc::new(MemoryStore::default()));
///
/// assert!(cache.set("greeting", "hello", Some(Ttl::Seconds(60))).unwrap());
/// let value: Option<String> = cache.get("greeting").unwrap();
/// assert_eq!(value.as_deref(), Some("hello"));
/// assert_eq!(cache.get_or("missing", 42).unwrap(), 42);
/// ```
#[derive(Debug)]
pub struct StoreCache<C, S = JsonSerializer> {
    client: Arc<C>,
    serializer: S,
}

impl<C> StoreCache<C, JsonSerializer>
where
    C: StoreClient,
{
    // == Constructor ==
    /// Creates a cache using the default `JsonSerializer`.
    pub fn new(client: Arc<C>) -> Self {
        Self::with_serializer(client, JsonSerializer::new())
    }
}

impl<C, S> StoreCache<C, S>
where
    C: StoreClient,
    S: Serializer,
{
    /// Creates a cache using a custom serializer.
    pub fn with_serializer(client: Arc<C>, serializer: S) -> Self {
        Self { client, serializer }
    }

    /// Reads and decodes `key`. Assumes the key is already validated.
    fn fetch<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        match self.client.get(key).map_err(CacheError::store)? {
            Some(raw) => {
                debug!(key, bytes = raw.len(), "Cache hit");
                self.serializer.unserialize(&raw).map(Some)
            }
            None => {
                debug!(key, "Cache miss");
                Ok(None)
            }
        }
    }

    /// Encodes and writes one pair. Assumes key and TTL are already validated.
    fn store<V>(&self, key: &str, value: &V, ttl: Option<&Ttl>) -> Result<bool>
    where
        V: Serialize + ?Sized,
    {
        let data = self.serializer.serialize(value)?;
        let status = self.client.set(key, &data).map_err(CacheError::store)?;

        if !status.is_ok() {
            warn!(key, status = %status, "Store refused write");
            return Ok(false);
        }

        self.set_expires(key, ttl)?;
        debug!(key, bytes = data.len(), ttl = ?ttl, "Stored value");
        Ok(true)
    }

    // == Set Expires ==
    /// Anchors the TTL to an absolute instant computed once, so latency
    /// between the write and this call does not stretch the lifetime.
    fn set_expires(&self, key: &str, ttl: Option<&Ttl>) -> Result<()> {
        let Some(ttl) = ttl else {
            return Ok(());
        };

        let timestamp = ttl.expires_at(Utc::now())?;
        let applied = self
            .client
            .expire_at(key, timestamp)
            .map_err(CacheError::store)?;

        if !applied {
            warn!(key, timestamp, "Key vanished before its expiration was set");
        }
        Ok(())
    }
}

fn validate_keys<I, K>(keys: I) -> Result<Vec<K>>
where
    I: IntoIterator<Item = K>,
    K: AsRef<str>,
{
    keys.into_iter()
        .map(|key| validate_key(key.as_ref()).map(|()| key))
        .collect()
}

// == Simple Cache Implementation ==
impl<C, S> SimpleCache for StoreCache<C, S>
where
    C: StoreClient,
    S: Serializer,
{
    fn get<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        validate_key(key)?;
        self.fetch(key)
    }

    fn get_or<T>(&self, key: &str, default: T) -> Result<T>
    where
        T: DeserializeOwned,
    {
        Ok(self.get(key)?.unwrap_or(default))
    }

    fn get_multiple<T, I, K>(&self, keys: I, default: T) -> Result<HashMap<String, T>>
    where
        T: DeserializeOwned + Clone,
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let keys = validate_keys(keys)?;

        let mut result = HashMap::with_capacity(keys.len());
        for key in &keys {
            let key: &str = key.as_ref();
            let value = self.fetch(key)?.unwrap_or_else(|| default.clone());
            result.insert(key.to_string(), value);
        }
        Ok(result)
    }

    fn set<V>(&self, key: &str, value: &V, ttl: Option<Ttl>) -> Result<bool>
    where
        V: Serialize + ?Sized,
    {
        validate_key(key)?;
        validate_ttl(ttl.as_ref())?;
        self.store(key, value, ttl.as_ref())
    }

    fn set_multiple<I, K, V>(&self, values: I, ttl: Option<Ttl>) -> Result<bool>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Serialize,
    {
        let pairs: Vec<(K, V)> = values.into_iter().collect();
        for (key, _) in &pairs {
            validate_key(key.as_ref())?;
        }
        validate_ttl(ttl.as_ref())?;

        let total = pairs.len();
        for (written, (key, value)) in pairs.iter().enumerate() {
            let key: &str = key.as_ref();
            if !self.store(key, value, ttl.as_ref())? {
                warn!(
                    key,
                    written,
                    skipped = total - written - 1,
                    "Aborting batch write after refused write"
                );
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn delete(&self, key: &str) -> Result<bool> {
        self.delete_multiple([key])
    }

    fn delete_multiple<I, K>(&self, keys: I) -> Result<bool>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let keys = validate_keys(keys)?;
        let keys: Vec<&str> = keys.iter().map(|key| key.as_ref()).collect();
        if keys.is_empty() {
            return Ok(true);
        }

        let removed = self.client.del(&keys).map_err(CacheError::store)?;
        debug!(requested = keys.len(), removed, "Deleted keys");
        Ok(removed == keys.len())
    }

    fn clear(&self) -> Result<bool> {
        self.client.flush_all().map_err(CacheError::store)?;
        info!("Flushed every key from the store");
        Ok(true)
    }

    fn has(&self, key: &str) -> Result<bool> {
        validate_key(key)?;
        let count = self.client.exists(key).map_err(CacheError::store)?;
        Ok(count > 0)
    }
}
