//! Expiry Sweep Task
//!
//! Background task that periodically removes expired PDFs from the cache.
//! The cache holds no timer of its own; whoever composes the process owns
//! this task's handle and aborts it on shutdown.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::SharedPdfCache;

/// Spawns a task that sweeps expired entries every `sweep_interval_secs`.
///
/// Each sweep takes the cache's write lock only for the duration of
/// `cleanup_expired`. An interval of 0 is treated as 1 second.
///
/// # Example
/// ```ignore
/// let cache = cache::shared(PdfCache::new(CacheConfig::default()));
/// let sweep_handle = spawn_cleanup_task(cache.clone(), 60);
/// // Later, during shutdown:
/// sweep_handle.abort();
/// ```
pub fn spawn_cleanup_task(cache: SharedPdfCache, sweep_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(sweep_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting PDF cache expiry sweep every {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = {
                let mut guard = cache.write().await;
                guard.cleanup_expired()
            };

            if removed > 0 {
                info!("Expiry sweep: removed {} expired PDFs", removed);
            } else {
                debug!("Expiry sweep: no expired PDFs found");
            }
        }
    })
}
