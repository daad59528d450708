//! Cache Expiry Sweep
//!
//! Background task that periodically removes expired local cache entries.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::cache::CacheService;
use crate::tasks::BackgroundTask;

/// Spawns a task that sweeps expired entries out of the cache's local store.
///
/// The first sweep runs one `interval` after spawning. Reads already drop
/// expired entries lazily; the sweep reclaims the ones nobody reads again.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(CacheService::new(CacheSettings::default(), None));
/// let sweep = spawn_expiry_sweep(cache.clone(), Duration::from_secs(300));
/// // Later, during shutdown:
/// sweep.stop();
/// ```
pub fn spawn_expiry_sweep(cache: Arc<CacheService>, interval: Duration) -> BackgroundTask {
    BackgroundTask::spawn("cache-expiry-sweep", async move {
        info!(
            "Starting cache expiry sweep with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.sweep_expired().await;

            if removed > 0 {
                info!("Cache sweep: removed {} expired entries", removed);
            } else {
                debug!("Cache sweep: no expired entries found");
            }
        }
    })
}
