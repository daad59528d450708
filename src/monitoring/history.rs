//! Bounded History Module
//!
//! Fixed-capacity sample buffer that keeps the most recent entries.

use std::collections::VecDeque;

use crate::monitoring::{TimeRange, Timestamped};

// == Bounded History ==
/// Trailing window over the last `capacity` pushed items.
///
/// - Front = oldest
/// - Back = newest
#[derive(Debug)]
pub struct BoundedHistory<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedHistory<T> {
    // == Constructor ==
    /// Creates an empty history holding at most `capacity` items.
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity.min(4096)),
            capacity,
        }
    }

    // == Push ==
    /// Appends `item` and drops the oldest entries beyond capacity.
    ///
    /// Returns how many entries were dropped.
    pub fn push(&mut self, item: T) -> usize {
        self.items.push_back(item);
        let overflow = self.items.len().saturating_sub(self.capacity);
        self.items.drain(..overflow);
        overflow
    }

    // == Retain ==
    /// Keeps only items for which `keep` returns true. Returns how many were removed.
    pub fn retain(&mut self, keep: impl FnMut(&T) -> bool) -> usize {
        let before = self.items.len();
        self.items.retain(keep);
        before - self.items.len()
    }

    // == Accessors ==
    /// Iterates oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    /// Number of items currently held.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if nothing is held.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Maximum number of items kept.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T: Timestamped + Clone> BoundedHistory<T> {
    // == Snapshot ==
    /// Clones out every item, or only those inside `range`, oldest first.
    pub fn snapshot(&self, range: Option<&TimeRange>) -> Vec<T> {
        self.items
            .iter()
            .filter(|item| range.map_or(true, |r| r.contains(item.timestamp())))
            .cloned()
            .collect()
    }
}
