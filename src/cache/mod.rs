//! Cache Module
//!
//! Best-effort key/value cache backed by a remote store with a local
//! in-process fallback.

mod entry;
mod keys;
mod local;
mod pattern;
mod remote;
mod service;
mod stats;


// Re-export public types
pub use entry::CacheEntry;
pub use keys::{property_key, search_key, user_key, PROPERTY_TTL, SEARCH_TTL, USER_TTL};
pub use local::LocalStore;
pub use pattern::GlobPattern;
pub use remote::{RedisStore, RemoteStore};
pub use service::{CacheMode, CacheService, CacheSettings};
pub use stats::CacheStats;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Maximum allowed invalidation pattern length in bytes
pub const MAX_PATTERN_LENGTH: usize = 1024;
