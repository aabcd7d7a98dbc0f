//! Count, total, max, and recent samples per operation name.

use std::collections::VecDeque;
use std::time::Duration;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use empathy_core::traits::IMetricsSink;

/// Aggregated latency for one operation name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OperationStats {
    pub count: u64,
    pub total_ms: f64,
    pub max_ms: f64,
    /// Most recent samples, oldest first. Bounded by the collector's history.
    recent_ms: VecDeque<f64>,
}

impl OperationStats {
    fn record(&mut self, latency_ms: f64, history: usize) {
        self.count += 1;
        self.total_ms += latency_ms;
        self.max_ms = self.max_ms.max(latency_ms);
        if history == 0 {
            return;
        }
        if self.recent_ms.len() == history {
            self.recent_ms.pop_front();
        }
        self.recent_ms.push_back(latency_ms);
    }

    pub fn avg_ms(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.total_ms / self.count as f64
    }

    /// Nearest-rank percentile over the recent samples. `p` in `[0, 1]`.
    pub fn recent_percentile_ms(&self, p: f64) -> f64 {
        if self.recent_ms.is_empty() {
            return 0.0;
        }
        let mut sorted: Vec<f64> = self.recent_ms.iter().copied().collect();
        sorted.sort_by(f64::total_cmp);
        let rank = (p.clamp(0.0, 1.0) * (sorted.len() - 1) as f64).round() as usize;
        sorted[rank]
    }

    pub fn recent(&self) -> impl Iterator<Item = f64> + '_ {
        self.recent_ms.iter().copied()
    }
}

/// Thread-safe [`IMetricsSink`]. Recording never blocks on other operation
/// names and never fails.
#[derive(Debug)]
pub struct OperationMetrics {
    operations: DashMap<String, OperationStats>,
    history: usize,
}

impl OperationMetrics {
    pub fn new(history: usize) -> Self {
        Self {
            operations: DashMap::new(),
            history,
        }
    }

    pub fn get(&self, name: &str) -> Option<OperationStats> {
        self.operations.get(name).map(|s| s.value().clone())
    }

    pub fn operation_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.operations.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn total_operations(&self) -> u64 {
        self.operations.iter().map(|e| e.value().count).sum()
    }

    /// JSON summary: `{ "<op>": { count, avg_ms, max_ms, p95_ms }, ... }`.
    pub fn snapshot(&self) -> serde_json::Value {
        let mut out = serde_json::Map::new();
        for name in self.operation_names() {
            if let Some(stats) = self.get(&name) {
                out.insert(
                    name,
                    serde_json::json!({
                        "count": stats.count,
                        "avg_ms": stats.avg_ms(),
                        "max_ms": stats.max_ms,
                        "p95_ms": stats.recent_percentile_ms(0.95),
                    }),
                );
            }
        }
        serde_json::Value::Object(out)
    }

    /// Reset all metrics (useful for testing or periodic rotation).
    pub fn reset(&self) {
        self.operations.clear();
    }
}

impl Default for OperationMetrics {
    fn default() -> Self {
        Self::new(empathy_core::config::defaults::DEFAULT_METRICS_HISTORY)
    }
}

impl IMetricsSink for OperationMetrics {
    fn record_operation(&self, name: &str, latency: Duration) {
        let latency_ms = latency.as_secs_f64() * 1_000.0;
        if let Some(mut stats) = self.operations.get_mut(name) {
            stats.record(latency_ms, self.history);
            return;
        }
        self.operations
            .entry(name.to_string())
            .or_default()
            .record(latency_ms, self.history);
    }
}
