mod metrics;
mod sanitizer;
mod store;

pub use metrics::{IMetricsSink, NoopMetrics};
pub use sanitizer::{IDataSanitizer, SanitizedData};
pub use store::{IKeyValueStore, IWatchedTransaction, StoreOp, TxOutcome};
