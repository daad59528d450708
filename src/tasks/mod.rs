//! Background Tasks Module
//!
//! Timer-driven tasks owned by the host application.
//!
//! # Tasks
//! - Expiry sweep: removes expired local cache entries
//! - Retention: drops old monitoring samples and closed rate-limit windows

mod retention;
mod sweep;

use std::future::Future;

use tokio::task::JoinHandle;
use tracing::debug;

pub use retention::spawn_retention_task;
pub use sweep::spawn_expiry_sweep;

/// Handle to a spawned background loop.
///
/// The loop stops on [`stop`](Self::stop) or when the handle is dropped.
#[derive(Debug)]
pub struct BackgroundTask {
    name: &'static str,
    handle: JoinHandle<()>,
}

impl BackgroundTask {
    pub(crate) fn spawn(name: &'static str, task: impl Future<Output = ()> + Send + 'static) -> Self {
        Self {
            name,
            handle: tokio::spawn(task),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn stop(&self) {
        self.handle.abort();
        debug!(task = self.name, "Background task stopped");
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for BackgroundTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
