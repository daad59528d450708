//! Monitor Module
//!
//! Collects request and error samples in bounded in-memory histories and
//! answers windowed queries over them.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use tracing::{error, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::monitoring::{
    Analytics, BoundedHistory, ErrorSample, PerformanceSample, SystemHealth, SystemProbe,
    TimeRange, Timer,
};

/// Tunables for [`Monitor`].
#[derive(Debug, Clone)]
pub struct MonitorSettings {
    /// Samples kept per history before the oldest are dropped
    pub capacity: usize,
    /// Requests above this many milliseconds are logged and counted as slow
    pub slow_request_ms: f64,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            capacity: 1000,
            slow_request_ms: 1000.0,
        }
    }
}

// == Monitor ==
/// Bounded request and error telemetry with windowed queries.
pub struct Monitor {
    settings: MonitorSettings,
    metrics: Mutex<BoundedHistory<PerformanceSample>>,
    errors: Mutex<BoundedHistory<ErrorSample>>,
    probe: SystemProbe,
    clock: Arc<dyn Clock>,
}

impl Monitor {
    // == Constructor ==
    /// Creates a monitor with empty histories sized by `settings.capacity`.
    pub fn new(settings: MonitorSettings) -> Self {
        Self {
            metrics: Mutex::new(BoundedHistory::new(settings.capacity)),
            errors: Mutex::new(BoundedHistory::new(settings.capacity)),
            settings,
            probe: SystemProbe::new(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the clock used by [`cleanup`](Self::cleanup) and [`now`](Self::now).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Returns the active settings.
    pub fn settings(&self) -> &MonitorSettings {
        &self.settings
    }

    /// Current time on the monitor's clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    // == Timing ==
    /// Starts a timer for one request.
    pub fn start_timing(&self) -> Timer {
        Timer::start()
    }

    // == Recording ==
    /// Appends a request sample, warning when it was slow.
    pub fn record_metric(&self, sample: PerformanceSample) {
        if sample.duration_ms > self.settings.slow_request_ms {
            warn!(
                endpoint = %sample.endpoint,
                method = %sample.method,
                duration = %format!("{:.2}ms", sample.duration_ms),
                status_code = sample.status_code,
                "Slow request detected"
            );
        }
        self.metrics.lock().push(sample);
    }

    /// Appends an error sample and logs it.
    pub fn record_error(&self, sample: ErrorSample) {
        error!(
            endpoint = %sample.endpoint,
            method = %sample.method,
            error = %sample.error_message,
            timestamp = %sample.timestamp,
            "API error recorded"
        );
        self.errors.lock().push(sample);
    }

    // == Queries ==
    /// Retained request samples, oldest first, optionally limited to `range`.
    pub fn metrics(&self, range: Option<&TimeRange>) -> Vec<PerformanceSample> {
        self.metrics.lock().snapshot(range)
    }

    /// Retained error samples, oldest first, optionally limited to `range`.
    pub fn errors(&self, range: Option<&TimeRange>) -> Vec<ErrorSample> {
        self.errors.lock().snapshot(range)
    }

    // == Reports ==
    /// Aggregates the samples inside `range`, or all retained samples.
    pub fn analytics(&self, range: Option<&TimeRange>) -> Analytics {
        let metrics = self.metrics(range);
        let errors = self.errors(range);
        Analytics::compute(
            &metrics,
            &errors,
            self.settings.slow_request_ms,
            self.probe.memory_usage(),
        )
    }

    /// Point-in-time process and host health.
    pub fn system_health(&self) -> SystemHealth {
        self.probe.health()
    }

    // == Cleanup ==
    /// Drops samples timestamped before `now - older_than_hours`.
    ///
    /// Returns the number of samples removed across both histories.
    pub fn cleanup(&self, older_than_hours: u64) -> usize {
        let hours = i64::try_from(older_than_hours).unwrap_or(i64::MAX);
        let cutoff = self
            .clock
            .now()
            .checked_sub_signed(Duration::try_hours(hours).unwrap_or(Duration::MAX))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let removed_metrics = self.metrics.lock().retain(|m| m.timestamp >= cutoff);
        let removed_errors = self.errors.lock().retain(|e| e.timestamp >= cutoff);
        let removed = removed_metrics + removed_errors;

        info!(
            older_than_hours,
            removed, "Cleaned up metrics older than {} hours", older_than_hours
        );
        removed
    }
}

impl Default for Monitor {
    fn default() -> Self {
        Self::new(MonitorSettings::default())
    }
}
