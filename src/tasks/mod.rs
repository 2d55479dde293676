//! Background Tasks Module
//!
//! Periodic maintenance for the in-memory store.
//!
//! # Tasks
//! - TTL Cleanup: Removes expired entries at configured intervals

mod cleanup;

pub use cleanup::spawn_cleanup_task;
