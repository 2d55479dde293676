//! Error types for the cache facade
//!
//! Provides unified error handling using thiserror.

use std::error::Error as StdError;

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for cache operations.
///
/// Validation problems (`InvalidKey`, `InvalidTtl`) are raised before any
/// store round trip. `InvalidArgument` covers values the serializer cannot
/// encode and stored bytes it cannot decode. Store failures pass through
/// untouched.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key is empty, too long, or contains a reserved character
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// TTL is negative, unparseable, or out of range
    #[error("Invalid TTL: {0}")]
    InvalidTtl(String),

    /// Value could not be serialized, or stored data could not be unserialized
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Failure reported by the underlying store client
    #[error(transparent)]
    Store(Box<dyn StdError + Send + Sync>),
}

impl CacheError {
    /// Wraps a store client error without altering its message or source chain.
    pub fn store<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        CacheError::Store(Box::new(err))
    }

    /// Returns true for errors raised by local validation or serialization,
    /// i.e. errors the caller can fix by changing its input.
    pub fn is_caller_error(&self) -> bool {
        !matches!(self, CacheError::Store(_))
    }
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
