//! Store Cache - A simple-cache facade over pluggable key-value stores
//!
//! Stores arbitrary serde values under validated string keys with optional
//! expiration, independent of the store client and the wire encoding.

pub mod cache;
pub mod config;
pub mod error;
pub mod serializer;
pub mod store;
pub mod tasks;
pub mod ttl;
pub mod validation;

pub use cache::{SimpleCache, StoreCache};
pub use config::Config;
pub use error::{CacheError, Result};
pub use serializer::{JsonSerializer, Serializer};
pub use store::{MemoryStore, MemoryStoreConfig, StoreClient, StoreStatus};
pub use tasks::spawn_cleanup_task;
pub use ttl::{Ttl, TtlInterval};
pub use validation::{validate_key, validate_ttl};
