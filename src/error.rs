//! Error types for the cache and monitoring service
//!
//! `CacheError` stays inside the cache module: the public cache API converts
//! it to `Option`/no-op after logging. `ApiError` is the HTTP boundary type.

use std::time::Duration;

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Failures talking to a cache backend.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The remote store rejected or failed a command
    #[error("Remote store error: {0}")]
    Remote(#[from] redis::RedisError),

    /// The remote store did not answer within the configured timeout
    #[error("Remote store timed out after {0:?}")]
    Timeout(Duration),

    /// No live connection to the remote store
    #[error("Remote store not connected")]
    NotConnected,

    /// A value could not be encoded or decoded as JSON
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An invalidation pattern could not be compiled
    #[error("Invalid key pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Result type for cache backend operations.
pub type CacheResult<T> = std::result::Result<T, CacheError>;

// == API Error Enum ==
/// Errors surfaced to HTTP clients.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Key not found in cache
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Caller exceeded its request window
    #[error("Too many requests")]
    RateLimited {
        /// Time until the caller's window resets
        retry_after: Duration,
    },

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Message of an [`ApiError`], attached to its response so request
/// telemetry can record what went wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorMessage(pub String);

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::RateLimited { .. } => (StatusCode::TOO_MANY_REQUESTS, self.to_string()),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(ErrorResponse::new(message.clone()));

        let mut response = (status, body).into_response();
        response.extensions_mut().insert(ErrorMessage(message));
        if let ApiError::RateLimited { retry_after } = self {
            // Round up so clients never retry inside the window
            let secs = retry_after.as_millis().div_ceil(1000);
            if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}

// == Result Type Alias ==
/// Convenience Result type for HTTP handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
