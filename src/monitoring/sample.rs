//! Telemetry sample types recorded by the monitor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request origin details, when the caller knows them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
}

/// One completed request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSample {
    pub endpoint: String,
    pub method: String,
    /// Wall time spent handling the request, in milliseconds
    pub duration_ms: f64,
    pub status_code: u16,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub client: ClientMeta,
}

/// One failed request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorSample {
    pub endpoint: String,
    pub method: String,
    pub error_message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub client: ClientMeta,
}

/// Inclusive `[start, end]` filter over sample timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Both ends included. An inverted range contains nothing.
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        timestamp >= self.start && timestamp <= self.end
    }
}

/// Samples that carry a timestamp, so histories can filter them by range.
pub trait Timestamped {
    fn timestamp(&self) -> DateTime<Utc>;
}

impl Timestamped for PerformanceSample {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl Timestamped for ErrorSample {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}
