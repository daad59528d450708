//! Rate Limiter Module
//!
//! Fixed-window request counting per client identifier.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::clock::{Clock, SystemClock};
use crate::error::ApiError;

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    /// Unix milliseconds at which the window closes
    reset_at: i64,
}

// == Fixed Window Limiter ==
/// Allows `max_requests` per identifier within each window.
///
/// A window opens on an identifier's first request and lasts `window`;
/// the first request after it closes opens a fresh one.
pub struct FixedWindowLimiter {
    max_requests: u32,
    window: Duration,
    windows: Mutex<HashMap<String, Window>>,
    clock: Arc<dyn Clock>,
}

impl FixedWindowLimiter {
    // == Constructor ==
    /// Creates a limiter allowing `max_requests` per `window`.
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            windows: Mutex::new(HashMap::new()),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the clock used to open and close windows.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    // == Check ==
    /// Counts one request for `identifier`.
    ///
    /// Fails with [`ApiError::RateLimited`] once the window's budget is spent;
    /// rejected requests are not counted.
    pub fn check(&self, identifier: &str) -> Result<(), ApiError> {
        let now = self.clock.now_ms();
        let window_ms = i64::try_from(self.window.as_millis()).unwrap_or(i64::MAX);
        let mut windows = self.windows.lock();

        match windows.get_mut(identifier) {
            Some(window) if now <= window.reset_at => {
                if window.count >= self.max_requests {
                    let remaining = u64::try_from(window.reset_at - now).unwrap_or(0);
                    return Err(ApiError::RateLimited {
                        retry_after: Duration::from_millis(remaining),
                    });
                }
                window.count += 1;
            }
            _ => {
                windows.insert(
                    identifier.to_string(),
                    Window {
                        count: 1,
                        reset_at: now.saturating_add(window_ms),
                    },
                );
            }
        }
        Ok(())
    }

    // == Purge ==
    /// Forgets windows that have closed. Returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now_ms();
        let mut windows = self.windows.lock();
        let before = windows.len();
        windows.retain(|_, window| now <= window.reset_at);
        before - windows.len()
    }

    /// Number of identifiers with a window on record.
    pub fn tracked(&self) -> usize {
        self.windows.lock().len()
    }
}
