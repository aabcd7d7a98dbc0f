use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::models::TtlStrategy;

/// Per-strategy TTL overrides in seconds (`working_results = 600`).
/// Unset strategies keep their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TtlConfig {
    pub working_results: Option<u64>,
    pub staged_patterns: Option<u64>,
    pub coordination: Option<u64>,
    pub conflict_context: Option<u64>,
    pub session: Option<u64>,
    pub stream_entry: Option<u64>,
    pub task_queue: Option<u64>,
}

impl TtlConfig {
    pub fn resolve(&self, strategy: TtlStrategy) -> Duration {
        self.override_for(strategy)
            .map(Duration::from_secs)
            .unwrap_or_else(|| strategy.default_duration())
    }

    pub fn with_override(mut self, strategy: TtlStrategy, secs: u64) -> Self {
        *self.slot_mut(strategy) = Some(secs);
        self
    }

    /// The first strategy overridden to zero seconds, if any.
    pub fn zero_override(&self) -> Option<TtlStrategy> {
        TtlStrategy::ALL
            .into_iter()
            .find(|&s| self.override_for(s) == Some(0))
    }

    fn override_for(&self, strategy: TtlStrategy) -> Option<u64> {
        match strategy {
            TtlStrategy::WorkingResults => self.working_results,
            TtlStrategy::StagedPatterns => self.staged_patterns,
            TtlStrategy::Coordination => self.coordination,
            TtlStrategy::ConflictContext => self.conflict_context,
            TtlStrategy::Session => self.session,
            TtlStrategy::StreamEntry => self.stream_entry,
            TtlStrategy::TaskQueue => self.task_queue,
        }
    }

    fn slot_mut(&mut self, strategy: TtlStrategy) -> &mut Option<u64> {
        match strategy {
            TtlStrategy::WorkingResults => &mut self.working_results,
            TtlStrategy::StagedPatterns => &mut self.staged_patterns,
            TtlStrategy::Coordination => &mut self.coordination,
            TtlStrategy::ConflictContext => &mut self.conflict_context,
            TtlStrategy::Session => &mut self.session,
            TtlStrategy::StreamEntry => &mut self.stream_entry,
            TtlStrategy::TaskQueue => &mut self.task_queue,
        }
    }
}
