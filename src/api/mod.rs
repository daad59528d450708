//! API Module
//!
//! HTTP handlers, middleware and routing for the cache service.
//!
//! # Endpoints
//! - `GET /health` - Health check endpoint
//! - `PUT /cache` - Store a JSON value
//! - `GET /cache/:key` - Retrieve a value by key
//! - `DELETE /cache/:key` - Delete a key
//! - `DELETE /cache` - Clear the cache
//! - `POST /cache/invalidate` - Delete keys matching a glob pattern
//! - `GET /cache/stats` - Get cache statistics
//! - `GET /admin/monitoring` - Telemetry reports

pub mod handlers;
pub mod middleware;
pub mod routes;
mod state;

pub use handlers::*;
pub use routes::create_router;
pub use state::AppState;
