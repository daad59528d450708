//! Domain Keys Module
//!
//! Namespaced keys and default TTLs for the marketplace's cached records.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{de::DeserializeOwned, Serialize};

use crate::cache::CacheService;

/// Default TTL for cached property listings (30 minutes)
pub const PROPERTY_TTL: u64 = 1800;
/// Default TTL for cached user records (15 minutes)
pub const USER_TTL: u64 = 900;
/// Default TTL for cached search results (10 minutes)
pub const SEARCH_TTL: u64 = 600;

pub fn property_key(property_id: &str) -> String {
    format!("property:{}", property_id)
}

pub fn user_key(user_id: &str) -> String {
    format!("user:{}", user_id)
}

/// Search keys embed the whole query, base64-encoded, so distinct queries
/// never share an entry and no query text can inject a `*` into a pattern.
pub fn search_key(query: &str) -> String {
    format!("search:{}", STANDARD.encode(query))
}

impl CacheService {
    pub async fn cache_property<T: Serialize>(&self, property_id: &str, property: &T, ttl: Option<u64>) {
        self.set(&property_key(property_id), property, Some(ttl.unwrap_or(PROPERTY_TTL)))
            .await;
    }

    pub async fn cached_property<T: DeserializeOwned>(&self, property_id: &str) -> Option<T> {
        self.get(&property_key(property_id)).await
    }

    pub async fn cache_user<T: Serialize>(&self, user_id: &str, user: &T, ttl: Option<u64>) {
        self.set(&user_key(user_id), user, Some(ttl.unwrap_or(USER_TTL)))
            .await;
    }

    pub async fn cached_user<T: DeserializeOwned>(&self, user_id: &str) -> Option<T> {
        self.get(&user_key(user_id)).await
    }

    pub async fn cache_search_results<T: Serialize>(&self, query: &str, results: &[T], ttl: Option<u64>) {
        self.set(&search_key(query), results, Some(ttl.unwrap_or(SEARCH_TTL)))
            .await;
    }

    pub async fn cached_search_results<T: DeserializeOwned>(&self, query: &str) -> Option<Vec<T>> {
        self.get(&search_key(query)).await
    }
}
