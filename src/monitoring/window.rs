//! Report window and report kind tokens accepted by the admin endpoint.

use chrono::{DateTime, Duration, Utc};

use crate::monitoring::TimeRange;

/// Trailing window ending now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportWindow {
    /// `1h`
    LastHour,
    /// `24h`
    #[default]
    LastDay,
    /// `7d`
    LastWeek,
    /// `30d`
    LastMonth,
}

impl ReportWindow {
    /// Parses a window token. Unrecognised tokens fall back to `24h`.
    pub fn parse(token: &str) -> Self {
        match token {
            "1h" => Self::LastHour,
            "24h" => Self::LastDay,
            "7d" => Self::LastWeek,
            "30d" => Self::LastMonth,
            _ => Self::default(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LastHour => "1h",
            Self::LastDay => "24h",
            Self::LastWeek => "7d",
            Self::LastMonth => "30d",
        }
    }

    pub fn length(&self) -> Duration {
        match self {
            Self::LastHour => Duration::hours(1),
            Self::LastDay => Duration::days(1),
            Self::LastWeek => Duration::days(7),
            Self::LastMonth => Duration::days(30),
        }
    }

    /// `[now - length, now]`.
    pub fn ending_at(&self, now: DateTime<Utc>) -> TimeRange {
        TimeRange::new(now - self.length(), now)
    }
}

/// Which report the admin endpoint should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportKind {
    #[default]
    Analytics,
    System,
    Errors,
    Metrics,
}

impl ReportKind {
    /// Parses a report token; `None` for anything unrecognised.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "analytics" => Some(Self::Analytics),
            "system" => Some(Self::System),
            "errors" => Some(Self::Errors),
            "metrics" => Some(Self::Metrics),
            _ => None,
        }
    }
}
