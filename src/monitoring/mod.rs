//! Monitoring Module
//!
//! In-process request and error telemetry with windowed aggregate queries.

mod analytics;
mod history;
mod recorder;
mod sample;
mod system;
mod timer;
mod window;

#[cfg(test)]
mod property_tests;

pub use analytics::{Analytics, EndpointCount, ErrorCount, TOP_ENDPOINTS};
pub use history::BoundedHistory;
pub use recorder::{Monitor, MonitorSettings};
pub use sample::{ClientMeta, ErrorSample, PerformanceSample, TimeRange, Timestamped};
pub use system::{CpuUsage, MemoryUsage, SystemHealth, SystemProbe};
pub use timer::Timer;
pub use window::{ReportKind, ReportWindow};
