//! Local Store Module
//!
//! Process-local key/value map with per-entry expiry. Serves every cache
//! operation while the remote store is unavailable.

use std::collections::HashMap;

use crate::cache::{CacheEntry, GlobPattern};

// == Local Store ==
/// In-process cache storage keyed by string.
#[derive(Debug, Default)]
pub struct LocalStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
}

impl LocalStore {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Set ==
    /// Stores a serialized value, overwriting any previous entry and its TTL.
    pub fn set(&mut self, key: String, value: String, ttl_seconds: u64, now_ms: i64) {
        self.entries
            .insert(key, CacheEntry::new(value, ttl_seconds, now_ms));
    }

    // == Get ==
    /// Returns the serialized value if present and live at `now_ms`.
    ///
    /// An expired entry is removed on the way out.
    pub fn get(&mut self, key: &str, now_ms: i64) -> Option<String> {
        let expired = self.entries.get(key)?.is_expired(now_ms);
        if expired {
            self.entries.remove(key);
            return None;
        }
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    // == Delete ==
    /// Removes an entry by key. Returns whether it existed.
    pub fn delete(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    // == Clear ==
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    // == Delete Matching ==
    /// Removes every key matching `pattern`. Returns the number removed.
    pub fn delete_matching(&mut self, pattern: &GlobPattern) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !pattern.matches(key));
        before - self.entries.len()
    }

    // == Cleanup Expired ==
    /// Removes all entries expired at `now_ms`.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self, now_ms: i64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now_ms));
        before - self.entries.len()
    }

    // == Length ==
    /// Returns the current number of entries, expired ones included until swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
