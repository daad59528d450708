//! Shared Application State

use std::sync::Arc;

use tracing::warn;

use crate::cache::{CacheService, RedisStore, RemoteStore};
use crate::config::Config;
use crate::limiter::FixedWindowLimiter;
use crate::monitoring::Monitor;

/// Application state shared across all handlers and middleware.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<CacheService>,
    pub monitor: Arc<Monitor>,
    pub limiter: Arc<FixedWindowLimiter>,
}

impl AppState {
    pub fn new(cache: CacheService, monitor: Monitor, limiter: FixedWindowLimiter) -> Self {
        Self {
            cache: Arc::new(cache),
            monitor: Arc::new(monitor),
            limiter: Arc::new(limiter),
        }
    }

    /// Builds the services from configuration.
    ///
    /// The cache is left disconnected; call [`CacheService::connect`] before
    /// serving. An unparsable `REDIS_URL` leaves the cache local-only.
    pub fn from_config(config: &Config) -> Self {
        let remote = config.redis_url.as_deref().and_then(|url| {
            match RedisStore::open(url) {
                Ok(store) => Some(Arc::new(store) as Arc<dyn RemoteStore>),
                Err(e) => {
                    warn!(error = %e, "Invalid REDIS_URL, using local cache only");
                    None
                }
            }
        });

        Self::new(
            CacheService::new(config.cache_settings(), remote),
            Monitor::new(config.monitor_settings()),
            FixedWindowLimiter::new(config.rate_limit_max, config.rate_limit_window()),
        )
    }
}
