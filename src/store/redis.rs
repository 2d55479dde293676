//! Redis Store Module
//!
//! `StoreClient` over a synchronous Redis connection.

use parking_lot::Mutex;
use redis::{Client, Connection, RedisError, Value};
use tracing::trace;

use crate::store::{StoreClient, StoreStatus};

// == Redis Store ==
/// Redis-backed store client.
///
/// Commands are serialized through one connection guarded by a mutex. The
/// connection's lifetime belongs to this value; timeouts and reconnection
/// are whatever the `redis` crate provides.
pub struct RedisStore {
    connection: Mutex<Connection>,
}

impl RedisStore {
    /// Connects to the server at `url`.
    ///
    /// Format: `redis://[username:password@]host[:port][/database]`
    ///
    /// # Example
    /// ```ignore
    /// let store = RedisStore::connect("redis://localhost:6379")?;
    /// ```
    pub fn connect(url: &str) -> Result<Self, RedisError> {
        let client = Client::open(url)?;
        let connection = client.get_connection()?;
        Ok(Self::from_connection(connection))
    }

    /// Wraps an already established connection.
    pub fn from_connection(connection: Connection) -> Self {
        Self {
            connection: Mutex::new(connection),
        }
    }
}

/// Maps a SET reply onto a status. Only `+OK` counts as success.
fn status_from_reply(reply: Value) -> StoreStatus {
    match reply {
        Value::Okay => StoreStatus::ok(),
        Value::SimpleString(payload) => StoreStatus::new(payload),
        Value::Nil => StoreStatus::new("(nil)"),
        other => StoreStatus::new(format!("{other:?}")),
    }
}

impl StoreClient for RedisStore {
    type Error = RedisError;

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, Self::Error> {
        trace!(key, "GET");
        redis::cmd("GET")
            .arg(key)
            .query(&mut *self.connection.lock())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<StoreStatus, Self::Error> {
        trace!(key, bytes = value.len(), "SET");
        let reply: Value = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .query(&mut *self.connection.lock())?;
        Ok(status_from_reply(reply))
    }

    fn del(&self, keys: &[&str]) -> Result<usize, Self::Error> {
        trace!(?keys, "DEL");
        redis::cmd("DEL")
            .arg(keys)
            .query(&mut *self.connection.lock())
    }

    fn exists(&self, key: &str) -> Result<usize, Self::Error> {
        trace!(key, "EXISTS");
        redis::cmd("EXISTS")
            .arg(key)
            .query(&mut *self.connection.lock())
    }

    fn expire_at(&self, key: &str, timestamp: i64) -> Result<bool, Self::Error> {
        trace!(key, timestamp, "EXPIREAT");
        redis::cmd("EXPIREAT")
            .arg(key)
            .arg(timestamp)
            .query(&mut *self.connection.lock())
    }

    fn flush_all(&self) -> Result<(), Self::Error> {
        trace!("FLUSHALL");
        redis::cmd("FLUSHALL").query(&mut *self.connection.lock())
    }
}
