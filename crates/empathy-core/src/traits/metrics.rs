use std::time::Duration;

/// Observational sink for operation latency.
///
/// Fire-and-forget: implementations must never block or fail the caller.
pub trait IMetricsSink: Send + Sync {
    fn record_operation(&self, name: &str, latency: Duration);
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl IMetricsSink for NoopMetrics {
    fn record_operation(&self, _name: &str, _latency: Duration) {}
}
