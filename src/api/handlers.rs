//! API Handlers
//!
//! HTTP request handlers for the cache and admin endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::Value;
use tracing::debug;

use super::AppState;
use crate::error::{ApiError, Result};
use crate::models::{
    validate_key, DeleteResponse, GetResponse, HealthResponse, InvalidateRequest,
    InvalidateResponse, MonitoringData, MonitoringQuery, MonitoringResponse, SetRequest,
    SetResponse, StatsResponse,
};
use crate::monitoring::{ReportKind, ReportWindow};

/// Handler for PUT /cache
///
/// Stores a JSON value with an optional TTL in seconds.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(ApiError::InvalidRequest(error_msg));
    }

    state.cache.set(&req.key, &req.value, req.ttl).await;

    Ok(Json(SetResponse::new(req.key)))
}

/// Handler for GET /cache/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    match state.cache.get::<Value>(&key).await {
        Some(value) => Ok(Json(GetResponse::new(key, value))),
        None => Err(ApiError::NotFound(format!("Key '{}' not found", key))),
    }
}

/// Handler for DELETE /cache/:key
///
/// Deleting an absent key still succeeds.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    if let Some(error_msg) = validate_key(&key) {
        return Err(ApiError::InvalidRequest(error_msg));
    }

    state.cache.delete(&key).await;

    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for DELETE /cache
pub async fn clear_handler(State(state): State<AppState>) -> Json<DeleteResponse> {
    state.cache.clear().await;
    Json(DeleteResponse::cleared())
}

/// Handler for POST /cache/invalidate
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Json(req): Json<InvalidateRequest>,
) -> Result<Json<InvalidateResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(ApiError::InvalidRequest(error_msg));
    }

    let removed = state.cache.invalidate_by_pattern(&req.pattern).await;

    Ok(Json(InvalidateResponse {
        pattern: req.pattern,
        removed,
    }))
}

/// Handler for GET /cache/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.cache.stats().await))
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.cache.mode().await))
}

/// Handler for GET /admin/monitoring
///
/// `timeRange` defaults to `24h`, `type` to `analytics`.
pub async fn monitoring_handler(
    State(state): State<AppState>,
    Query(query): Query<MonitoringQuery>,
) -> Result<Json<MonitoringResponse>> {
    let window = query
        .time_range
        .as_deref()
        .map(ReportWindow::parse)
        .unwrap_or_default();
    let kind = match query.kind.as_deref() {
        None => ReportKind::default(),
        Some(token) => ReportKind::parse(token).ok_or_else(|| {
            ApiError::InvalidRequest("Invalid monitoring type".to_string())
        })?,
    };
    debug!(window = window.as_str(), ?kind, "Building monitoring report");

    let range = window.ending_at(state.monitor.now());
    let monitor = &state.monitor;
    let data = match kind {
        ReportKind::Analytics => MonitoringData::Analytics(monitor.analytics(Some(&range))),
        ReportKind::System => MonitoringData::System(monitor.system_health()),
        ReportKind::Errors => {
            let errors = monitor.errors(Some(&range));
            MonitoringData::Errors {
                total: errors.len(),
                errors,
            }
        }
        ReportKind::Metrics => {
            let metrics = monitor.metrics(Some(&range));
            MonitoringData::Metrics {
                total: metrics.len(),
                metrics,
            }
        }
    };

    Ok(Json(MonitoringResponse {
        success: true,
        time_range: window.as_str(),
        data,
    }))
}
