//! Expiry Sweep Task
//!
//! Background task that periodically removes expired entries from a
//! [`MemoryStore`]. Reads already skip expired entries; the sweep only keeps
//! keys that are never read again from piling up.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::storage::MemoryStore;

/// Spawns a background task that periodically purges expired store entries.
///
/// The task runs in an infinite loop, sleeping for the specified interval
/// between sweeps.
///
/// # Arguments
/// * `store` - Shared store to sweep
/// * `cleanup_interval_secs` - Interval in seconds between sweeps
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let store = Arc::new(MemoryStore::new());
/// let cleanup_handle = spawn_cleanup_task(store.clone(), 1);
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task(store: Arc<MemoryStore>, cleanup_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting expiry sweep task with interval of {} seconds",
            cleanup_interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = store.purge_expired();

            if removed > 0 {
                info!("Expiry sweep: removed {} expired entries", removed);
            } else {
                debug!("Expiry sweep: no expired entries found");
            }
        }
    })
}
