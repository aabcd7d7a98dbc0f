use std::sync::Arc;
use std::time::Instant;

use empathy_core::traits::IMetricsSink;

/// Records the elapsed time under `name` when dropped, so every exit path of
/// an operation (including `?` early returns) is measured.
pub struct OperationTimer {
    sink: Arc<dyn IMetricsSink>,
    name: &'static str,
    started: Instant,
}

impl OperationTimer {
    pub fn start(sink: Arc<dyn IMetricsSink>, name: &'static str) -> Self {
        Self {
            sink,
            name,
            started: Instant::now(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Drop for OperationTimer {
    fn drop(&mut self) {
        self.sink
            .record_operation(self.name, self.started.elapsed());
    }
}
