//! Operation latency metrics.

mod operation_metrics;
mod timer;

pub use operation_metrics::{OperationMetrics, OperationStats};
pub use timer::OperationTimer;
