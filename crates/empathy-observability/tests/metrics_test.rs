use std::sync::Arc;
use std::thread;
use std::time::Duration;

use empathy_core::config::ObservabilityConfig;
use empathy_core::traits::IMetricsSink;
use empathy_observability::tracing_setup::spans::names;
use empathy_observability::{init_tracing, OperationMetrics, OperationTimer};

#[test]
fn records_count_total_and_max() {
    let metrics = OperationMetrics::new(10);
    metrics.record_operation("stash", Duration::from_millis(2));
    metrics.record_operation("stash", Duration::from_millis(6));
    metrics.record_operation("retrieve", Duration::from_millis(1));

    let stash = metrics.get("stash").unwrap();
    assert_eq!(stash.count, 2);
    assert!((stash.avg_ms() - 4.0).abs() < 1e-9);
    assert!((stash.max_ms - 6.0).abs() < 1e-9);
    assert_eq!(metrics.operation_names(), vec!["retrieve", "stash"]);
    assert_eq!(metrics.total_operations(), 3);
    assert!(metrics.get("missing").is_none());
}

#[test]
fn snapshot_is_keyed_by_operation() {
    let metrics = OperationMetrics::new(10);
    metrics.record_operation("queue_push", Duration::from_millis(3));
    let snap = metrics.snapshot();
    assert_eq!(snap["queue_push"]["count"], 1);
    assert!(snap["queue_push"]["p95_ms"].as_f64().unwrap() > 0.0);

    metrics.reset();
    assert_eq!(metrics.snapshot(), serde_json::json!({}));
}

#[test]
fn timer_records_on_drop() {
    let metrics = Arc::new(OperationMetrics::new(10));
    {
        let timer = OperationTimer::start(metrics.clone(), "stage_pattern");
        assert_eq!(timer.name(), "stage_pattern");
    }
    assert_eq!(metrics.get("stage_pattern").unwrap().count, 1);
}

#[test]
fn concurrent_recording_loses_nothing() {
    let metrics = Arc::new(OperationMetrics::new(5));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let metrics = metrics.clone();
            thread::spawn(move || {
                for _ in 0..250 {
                    metrics.record_operation("pop", Duration::from_micros(10));
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    let pop = metrics.get("pop").unwrap();
    assert_eq!(pop.count, 2_000);
    assert_eq!(pop.recent().count(), 5);
}

#[test]
fn init_tracing_is_idempotent() {
    let config = ObservabilityConfig::default();
    let first = init_tracing(&config);
    let second = init_tracing(&config);
    assert!(!second || !first);
    let _span = empathy_observability::transaction_span!("promote", "empathy:staged:p1").entered();
    assert_eq!(names::TRANSACTION, "empathy.transaction");
}
