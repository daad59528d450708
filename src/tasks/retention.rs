//! Telemetry Retention Task
//!
//! Background task that bounds monitor memory by age and forgets closed
//! rate-limit windows.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::limiter::FixedWindowLimiter;
use crate::monitoring::Monitor;
use crate::tasks::BackgroundTask;

/// Spawns a task that, every `interval`, drops monitor samples older than
/// `retention_hours` and purges closed rate-limit windows.
pub fn spawn_retention_task(
    monitor: Arc<Monitor>,
    limiter: Arc<FixedWindowLimiter>,
    interval: Duration,
    retention_hours: u64,
) -> BackgroundTask {
    BackgroundTask::spawn("telemetry-retention", async move {
        info!(
            "Starting telemetry retention task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            monitor.cleanup(retention_hours);

            let purged = limiter.purge_expired();
            debug!("Retention: purged {} closed rate-limit windows", purged);
        }
    })
}
