//! API Middleware
//!
//! Request interceptors for telemetry and rate limiting.

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use super::AppState;
use crate::error::ErrorMessage;
use crate::monitoring::{ClientMeta, ErrorSample, PerformanceSample};

const FORWARDED_FOR: &str = "x-forwarded-for";
const REAL_IP: &str = "x-real-ip";
const ANONYMOUS: &str = "anonymous";

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Rate-limit key for a request: first `x-forwarded-for` hop, then
/// `x-real-ip`, then `"anonymous"`.
pub fn client_identifier(headers: &HeaderMap) -> String {
    header_str(headers, FORWARDED_FOR)
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .or_else(|| header_str(headers, REAL_IP))
        .unwrap_or(ANONYMOUS)
        .to_string()
}

fn client_meta(headers: &HeaderMap) -> ClientMeta {
    ClientMeta {
        user_agent: header_str(headers, "user-agent").map(str::to_string),
        ip: header_str(headers, FORWARDED_FOR)
            .or_else(|| header_str(headers, REAL_IP))
            .map(str::to_string),
    }
}

/// Records a performance sample for every request and an error sample for
/// every 5xx response.
///
/// The error sample carries the handler's [`ErrorMessage`] when there is
/// one, otherwise the status reason phrase.
pub async fn track_requests(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let timer = state.monitor.start_timing();
    let timestamp = state.monitor.now();
    let method = request.method().to_string();
    let endpoint = request.uri().path().to_string();
    let client = client_meta(request.headers());

    let response = next.run(request).await;
    let status = response.status();

    if status.is_server_error() {
        state.monitor.record_error(ErrorSample {
            endpoint: endpoint.clone(),
            method: method.clone(),
            error_message: response
                .extensions()
                .get::<ErrorMessage>()
                .map(|message| message.0.clone())
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or_else(|| "Server error".to_string()),
            stack_trace: None,
            timestamp,
            client: client.clone(),
        });
    }

    state.monitor.record_metric(PerformanceSample {
        endpoint,
        method,
        duration_ms: timer.end(),
        status_code: status.as_u16(),
        timestamp,
        client,
    });

    response
}

/// Rejects callers over their request budget with 429.
pub async fn rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let identifier = client_identifier(request.headers());

    match state.limiter.check(&identifier) {
        Ok(()) => next.run(request).await,
        Err(e) => {
            warn!(
                client = %identifier,
                path = %request.uri().path(),
                "Rate limit exceeded"
            );
            e.into_response()
        }
    }
}
