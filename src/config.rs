//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::CacheSettings;
use crate::monitoring::MonitorSettings;

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Remote cache store URL; `None` runs the cache on the local store only
    pub redis_url: Option<String>,
    /// Default TTL in seconds for cache writes without explicit TTL
    pub default_ttl: u64,
    /// Upper bound for a single remote store operation, in milliseconds
    pub remote_timeout_ms: u64,
    /// Local cache expiry sweep interval in seconds
    pub sweep_interval: u64,
    /// Maximum samples kept per monitoring history
    pub metrics_capacity: usize,
    /// Requests slower than this many milliseconds are logged as slow
    pub slow_request_ms: f64,
    /// Samples older than this many hours are dropped by the retention task
    pub metrics_retention_hours: u64,
    /// Retention task interval in seconds
    pub metrics_cleanup_interval: u64,
    /// Requests allowed per client per window
    pub rate_limit_max: u32,
    /// Rate limit window length in milliseconds
    pub rate_limit_window_ms: u64,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `REDIS_URL` - Remote store URL (default: unset, local store only)
    /// - `DEFAULT_TTL` - Default TTL in seconds (default: 300)
    /// - `REMOTE_TIMEOUT_MS` - Remote operation timeout (default: 2000)
    /// - `SWEEP_INTERVAL` - Local expiry sweep in seconds (default: 300)
    /// - `METRICS_CAPACITY` - Samples kept per history (default: 1000)
    /// - `SLOW_REQUEST_MS` - Slow request threshold (default: 1000)
    /// - `METRICS_RETENTION_HOURS` - Sample retention (default: 24)
    /// - `METRICS_CLEANUP_INTERVAL` - Retention task in seconds (default: 3600)
    /// - `RATE_LIMIT_MAX` - Requests per window (default: 100)
    /// - `RATE_LIMIT_WINDOW_MS` - Window length (default: 60000)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            redis_url: env::var("REDIS_URL").ok().filter(|url| !url.is_empty()),
            default_ttl: parse_var("DEFAULT_TTL", defaults.default_ttl),
            remote_timeout_ms: parse_var("REMOTE_TIMEOUT_MS", defaults.remote_timeout_ms),
            sweep_interval: parse_var("SWEEP_INTERVAL", defaults.sweep_interval),
            metrics_capacity: parse_var("METRICS_CAPACITY", defaults.metrics_capacity),
            slow_request_ms: parse_var("SLOW_REQUEST_MS", defaults.slow_request_ms),
            metrics_retention_hours: parse_var(
                "METRICS_RETENTION_HOURS",
                defaults.metrics_retention_hours,
            ),
            metrics_cleanup_interval: parse_var(
                "METRICS_CLEANUP_INTERVAL",
                defaults.metrics_cleanup_interval,
            ),
            rate_limit_max: parse_var("RATE_LIMIT_MAX", defaults.rate_limit_max),
            rate_limit_window_ms: parse_var("RATE_LIMIT_WINDOW_MS", defaults.rate_limit_window_ms),
            server_port: parse_var("SERVER_PORT", defaults.server_port),
        }
    }

    /// Cache service settings derived from this config.
    pub fn cache_settings(&self) -> CacheSettings {
        CacheSettings {
            default_ttl: self.default_ttl,
            remote_timeout: Duration::from_millis(self.remote_timeout_ms),
        }
    }

    /// Monitoring recorder settings derived from this config.
    pub fn monitor_settings(&self) -> MonitorSettings {
        MonitorSettings {
            capacity: self.metrics_capacity,
            slow_request_ms: self.slow_request_ms,
        }
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_millis(self.rate_limit_window_ms)
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            redis_url: None,
            default_ttl: 300,
            remote_timeout_ms: 2000,
            sweep_interval: 300,
            metrics_capacity: 1000,
            slow_request_ms: 1000.0,
            metrics_retention_hours: 24,
            metrics_cleanup_interval: 3600,
            rate_limit_max: 100,
            rate_limit_window_ms: 60_000,
            server_port: 3000,
        }
    }
}
