//! TTL Cleanup Task
//!
//! Background task that periodically sweeps expired cache entries.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::SharedCache;

/// Spawns a background task that periodically removes expired entries from `cache`.
///
/// Lookups already evict lazily; the sweep keeps entries that are never read
/// again from accumulating. The returned handle is aborted on shutdown.
///
/// # Example
/// ```ignore
/// let cache = TtlCache::<Value>::shared(Duration::from_secs(300));
/// let handle = spawn_cleanup_task("search", cache.clone(), 60);
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_cleanup_task<V>(
    name: &'static str,
    cache: SharedCache<V>,
    cleanup_interval_secs: u64,
) -> JoinHandle<()>
where
    V: Clone + Send + Sync + 'static,
{
    spawn_cleanup_every(name, cache, Duration::from_secs(cleanup_interval_secs))
}

fn spawn_cleanup_every<V>(
    name: &'static str,
    cache: SharedCache<V>,
    interval: Duration,
) -> JoinHandle<()>
where
    V: Clone + Send + Sync + 'static,
{
    tokio::spawn(async move {
        info!(
            cache = name,
            "Starting TTL cleanup task with interval of {:?}", interval
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = {
                let mut cache_guard = cache.write().await;
                cache_guard.cleanup()
            };

            if removed > 0 {
                info!(cache = name, "TTL cleanup: removed {} expired entries", removed);
            } else {
                debug!(cache = name, "TTL cleanup: no expired entries found");
            }
        }
    })
}
