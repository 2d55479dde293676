//! Validation Module
//!
//! Pure key and TTL checks shared by every cache operation. Nothing here
//! touches a store, so callers can validate input without a facade.

use chrono::Utc;

use crate::error::{CacheError, Result};
use crate::ttl::Ttl;

// == Public Constants ==
/// Maximum allowed key length in characters
pub const MAX_KEY_LENGTH: usize = 64;

/// Characters that may not appear in a cache key
pub const RESERVED_KEY_CHARACTERS: &[char] = &['{', '}', '(', ')', '/', '\\', '@', ':'];

// == Validate Key ==
/// Checks that `key` is a legal cache key.
///
/// Keys must be non-empty, at most `MAX_KEY_LENGTH` characters, and free of
/// `RESERVED_KEY_CHARACTERS`. Keys are compared byte-exact, so no
/// normalization happens here.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::InvalidKey("key cannot be empty".to_string()));
    }

    let length = key.chars().count();
    if length > MAX_KEY_LENGTH {
        return Err(CacheError::InvalidKey(format!(
            "key exceeds maximum length of {MAX_KEY_LENGTH} characters (got {length})"
        )));
    }

    if let Some(reserved) = key.chars().find(|c| RESERVED_KEY_CHARACTERS.contains(c)) {
        return Err(CacheError::InvalidKey(format!(
            "key '{key}' contains reserved character '{reserved}'"
        )));
    }

    Ok(())
}

// == Validate TTL ==
/// Checks that `ttl`, when present, converts to an absolute expiration
/// instant from the current time.
pub fn validate_ttl(ttl: Option<&Ttl>) -> Result<()> {
    match ttl {
        Some(ttl) => ttl.expires_at(Utc::now()).map(|_| ()),
        None => Ok(()),
    }
}
