//! Property-Based Tests for Monitoring Module

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

use crate::monitoring::{
    Analytics, BoundedHistory, ClientMeta, MemoryUsage, PerformanceSample, TimeRange,
};

fn sample(offset_secs: i64, duration_ms: f64) -> PerformanceSample {
    PerformanceSample {
        endpoint: "/api/property".to_string(),
        method: "GET".to_string(),
        duration_ms,
        status_code: 200,
        timestamp: Utc.timestamp_opt(1_700_000_000, 0).unwrap() + Duration::seconds(offset_secs),
        client: ClientMeta::default(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // The history always holds the last min(pushed, capacity) items in order.
    #[test]
    fn prop_history_keeps_most_recent(capacity in 0usize..50, pushed in 0usize..200) {
        let mut history = BoundedHistory::new(capacity);
        for i in 0..pushed {
            history.push(i);
        }

        let expected: Vec<usize> = (pushed.saturating_sub(capacity)..pushed).collect();
        prop_assert_eq!(history.iter().copied().collect::<Vec<_>>(), expected);
    }

    // Range snapshots return exactly the samples whose timestamp lies inside.
    #[test]
    fn prop_snapshot_respects_range(
        offsets in prop::collection::vec(-500i64..500, 0..80),
        start in -500i64..500,
        len in 0i64..500,
    ) {
        let mut history = BoundedHistory::new(1000);
        for offset in &offsets {
            history.push(sample(*offset, 1.0));
        }
        let base = sample(0, 0.0).timestamp;
        let range = TimeRange::new(base + Duration::seconds(start), base + Duration::seconds(start + len));

        let inside = history.snapshot(Some(&range));

        let expected = offsets.iter().filter(|o| **o >= start && **o <= start + len).count();
        prop_assert_eq!(inside.len(), expected);
        prop_assert!(inside.iter().all(|s| range.contains(s.timestamp)));
    }

    // Aggregates stay consistent with the raw samples.
    #[test]
    fn prop_analytics_consistent(durations in prop::collection::vec(0.0f64..5000.0, 0..100)) {
        let metrics: Vec<_> = durations.iter().map(|d| sample(0, *d)).collect();

        let analytics = Analytics::compute(&metrics, &[], 1000.0, MemoryUsage::default());

        prop_assert_eq!(analytics.total_requests, durations.len());
        prop_assert_eq!(analytics.slow_requests, durations.iter().filter(|d| **d > 1000.0).count());
        let counted: usize = analytics.status_code_breakdown.values().sum();
        prop_assert_eq!(counted, durations.len());
        if durations.is_empty() {
            prop_assert_eq!(analytics.average_response_time, 0.0);
        } else {
            let mean = durations.iter().sum::<f64>() / durations.len() as f64;
            prop_assert!((analytics.average_response_time - mean).abs() <= 0.005 + 1e-9);
        }
    }
}
