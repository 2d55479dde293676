//! TTL Cleanup Task
//!
//! Background task that periodically removes expired entries from a
//! `MemoryStore`. Expired entries are already invisible to readers; the
//! sweep only reclaims their memory.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::store::MemoryStore;

/// Spawns a background task that sweeps expired entries every
/// `cleanup_interval_secs` seconds.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during shutdown.
///
/// # Example
/// ```ignore
/// let store = Arc::new(MemoryStore::default());
/// let cleanup_handle = spawn_cleanup_task(store.clone(), 1);
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task(store: Arc<MemoryStore>, cleanup_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting TTL cleanup task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = store.cleanup_expired();

            if removed > 0 {
                info!("TTL cleanup: removed {} expired entries", removed);
            } else {
                debug!("TTL cleanup: no expired entries found");
            }
        }
    })
}
