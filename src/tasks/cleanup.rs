//! Cache Expiry Sweep
//!
//! Background task that periodically purges expired directory list cache
//! entries. Reads already evict lazily; the sweep bounds memory held by
//! entries nobody asks about again.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::DirectoryListCache;

/// Spawns a background task that calls
/// [`DirectoryListCache::cleanup_expired`] every `cleanup_interval_secs`.
///
/// The returned handle is aborted during graceful shutdown. An interval of
/// zero disables the sweep: the task finishes at once without touching the
/// cache.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(DirectoryListCache::default());
/// let sweeper = spawn_cleanup_task(cache.clone(), 60);
/// // Later, during shutdown:
/// sweeper.abort();
/// ```
pub fn spawn_cleanup_task(
    cache: Arc<DirectoryListCache>,
    cleanup_interval_secs: u64,
) -> JoinHandle<()> {
    if cleanup_interval_secs == 0 {
        warn!("Cache expiry sweep disabled: interval is 0 seconds");
        return tokio::spawn(async {});
    }

    let interval = Duration::from_secs(cleanup_interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting cache expiry sweep with interval of {} seconds",
            cleanup_interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.cleanup_expired();
            if removed > 0 {
                info!("Expiry sweep: removed {} cache entries", removed);
            } else {
                debug!("Expiry sweep: no expired entries found");
            }
        }
    })
}
