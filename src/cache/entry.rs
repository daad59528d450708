//! Cache Entry Module
//!
//! Defines the structure for local cache entries with absolute expiry.

// == Cache Entry ==
/// A serialized value held by the local store.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// JSON encoding of the stored value
    pub value: String,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: i64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry written at `now_ms` that lives for `ttl_seconds`.
    pub fn new(value: String, ttl_seconds: u64, now_ms: i64) -> Self {
        let ttl_ms = i64::try_from(ttl_seconds.saturating_mul(1000)).unwrap_or(i64::MAX);
        Self {
            value,
            created_at: now_ms,
            expires_at: now_ms.saturating_add(ttl_ms),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now_ms`.
    ///
    /// An entry is live while its expiry lies strictly in the future, so it
    /// is expired from the exact millisecond its TTL has fully elapsed.
    pub fn is_expired(&self, now_ms: i64) -> bool {
        now_ms >= self.expires_at
    }

    // == Time To Live ==
    /// Remaining lifetime in milliseconds, `0` once expired.
    pub fn ttl_remaining_ms(&self, now_ms: i64) -> u64 {
        u64::try_from(self.expires_at - now_ms).unwrap_or(0)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    const T0: i64 = 1_700_000_000_000;

    #[test]
    fn test_entry_creation() {
        let entry = CacheEntry::new("\"test_value\"".to_string(), 60, T0);

        assert_eq!(entry.value, "\"test_value\"");
        assert_eq!(entry.created_at, T0);
        assert_eq!(entry.expires_at, T0 + 60_000);
        assert!(!entry.is_expired(T0));
    }

    #[test]
    fn test_entry_expiration() {
        let entry = CacheEntry::new("1".to_string(), 1, T0);

        assert!(!entry.is_expired(T0 + 500));
        assert!(entry.is_expired(T0 + 1500));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let entry = CacheEntry::new("1".to_string(), 1, T0);

        // Expired exactly when the TTL has fully elapsed
        assert!(!entry.is_expired(T0 + 999));
        assert!(entry.is_expired(T0 + 1000));
    }

    #[test]
    fn test_zero_ttl_is_immediately_expired() {
        let entry = CacheEntry::new("1".to_string(), 0, T0);
        assert!(entry.is_expired(T0));
    }

    #[test]
    fn test_ttl_remaining_ms() {
        let entry = CacheEntry::new("1".to_string(), 10, T0);

        assert_eq!(entry.ttl_remaining_ms(T0 + 1_000), 9_000);
        assert_eq!(entry.ttl_remaining_ms(T0 + 20_000), 0);
    }
}
