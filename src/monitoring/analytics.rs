//! Analytics Module
//!
//! Aggregates over a filtered set of performance and error samples.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::monitoring::{ErrorSample, MemoryUsage, PerformanceSample};

/// Number of entries kept in `top_endpoints`.
pub const TOP_ENDPOINTS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointCount {
    /// `METHOD path`
    pub endpoint: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorCount {
    pub error: String,
    pub count: usize,
}

/// Aggregate view of one time window.
#[derive(Debug, Clone, Serialize)]
pub struct Analytics {
    pub total_requests: usize,
    /// Mean duration in ms, two decimals; `0` without requests
    pub average_response_time: f64,
    pub slow_requests: usize,
    /// Errors per hundred requests, two decimals; `0` without requests
    pub error_rate: f64,
    pub top_endpoints: Vec<EndpointCount>,
    pub error_breakdown: Vec<ErrorCount>,
    pub status_code_breakdown: BTreeMap<u16, usize>,
    /// Process memory at the time the report was built, in bytes
    pub memory_usage: MemoryUsage,
}

impl Analytics {
    /// Builds the report. `slow_request_ms` is the strict threshold for
    /// counting a request as slow.
    pub fn compute(
        metrics: &[PerformanceSample],
        errors: &[ErrorSample],
        slow_request_ms: f64,
        memory_usage: MemoryUsage,
    ) -> Self {
        let total_requests = metrics.len();

        let (average_response_time, error_rate) = if total_requests == 0 {
            (0.0, 0.0)
        } else {
            let total_ms: f64 = metrics.iter().map(|m| m.duration_ms).sum();
            let requests = total_requests as f64;
            (
                round2(total_ms / requests),
                round2(errors.len() as f64 / requests * 100.0),
            )
        };

        let slow_requests = metrics
            .iter()
            .filter(|m| m.duration_ms > slow_request_ms)
            .count();

        let top_endpoints = ranked(metrics.iter().map(|m| format!("{} {}", m.method, m.endpoint)))
            .into_iter()
            .take(TOP_ENDPOINTS)
            .map(|(endpoint, count)| EndpointCount { endpoint, count })
            .collect();

        let error_breakdown = ranked(errors.iter().map(|e| e.error_message.clone()))
            .into_iter()
            .map(|(error, count)| ErrorCount { error, count })
            .collect();

        let mut status_code_breakdown = BTreeMap::new();
        for metric in metrics {
            *status_code_breakdown.entry(metric.status_code).or_insert(0) += 1;
        }

        Self {
            total_requests,
            average_response_time,
            slow_requests,
            error_rate,
            top_endpoints,
            error_breakdown,
            status_code_breakdown,
            memory_usage,
        }
    }
}

/// Counts occurrences, most frequent first, ties alphabetical.
fn ranked(labels: impl Iterator<Item = String>) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for label in labels {
        *counts.entry(label).or_insert(0) += 1;
    }

    let mut ranked: Vec<_> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
