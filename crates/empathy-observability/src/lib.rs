//! # empathy-observability
//!
//! Operation latency metrics ([`OperationMetrics`], the concrete
//! `IMetricsSink`), an RAII [`OperationTimer`], tracing subscriber setup, and
//! span definitions for memory operations.

pub mod metrics;
pub mod tracing_setup;

pub use metrics::{OperationMetrics, OperationStats, OperationTimer};
pub use tracing_setup::init_tracing;
