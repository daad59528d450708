//! Cache Statistics Module
//!
//! Tracks read outcomes and swallowed backend errors.

use serde::Serialize;

use crate::cache::CacheMode;

// == Cache Stats ==
/// Snapshot of cache service counters.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    /// Reads that returned a value
    pub hits: u64,
    /// Reads that returned nothing (absent, expired, or failed)
    pub misses: u64,
    /// Backend errors that were logged and swallowed
    pub errors: u64,
    /// Entries held by the local store
    pub local_entries: usize,
    /// Store mode at snapshot time
    pub mode: CacheMode,
}

impl Default for CacheStats {
    fn default() -> Self {
        Self {
            hits: 0,
            misses: 0,
            errors: 0,
            local_entries: 0,
            mode: CacheMode::Disconnected,
        }
    }
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Recording ==
    /// Increments the hit counter.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    /// Increments the miss counter.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// Increments the swallowed-error counter.
    pub fn record_error(&mut self) {
        self.errors += 1;
    }
}
