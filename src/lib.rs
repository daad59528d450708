//! Estate Cache - caching and request telemetry for a property marketplace API
//!
//! A best-effort cache that prefers Redis and falls back to an in-process
//! TTL store, plus bounded request/error telemetry with analytics reports.

pub mod api;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod limiter;
pub mod models;
pub mod monitoring;
pub mod tasks;

pub use api::{create_router, AppState};
pub use cache::{CacheMode, CacheService};
pub use config::Config;
pub use monitoring::Monitor;
pub use tasks::{spawn_expiry_sweep, spawn_retention_task, BackgroundTask};
