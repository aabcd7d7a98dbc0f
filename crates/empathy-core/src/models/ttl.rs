//! Named expiry classes for stored records.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A named expiry duration applied to a class of records.
///
/// The default durations can be overridden per deployment through
/// [`crate::config::TtlConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TtlStrategy {
    /// Agent scratch results: 1 hour.
    WorkingResults,
    /// Patterns awaiting review: 24 hours.
    StagedPatterns,
    /// Coordination signals between agents: 5 minutes.
    Coordination,
    /// Conflict negotiation records: 7 days.
    ConflictContext,
    /// Collaboration sessions: 30 minutes.
    Session,
    /// Stream retention: 7 days.
    StreamEntry,
    /// Task queues: 4 hours.
    TaskQueue,
}

impl TtlStrategy {
    pub const ALL: [TtlStrategy; 7] = [
        Self::WorkingResults,
        Self::StagedPatterns,
        Self::Coordination,
        Self::ConflictContext,
        Self::Session,
        Self::StreamEntry,
        Self::TaskQueue,
    ];

    pub fn default_secs(self) -> u64 {
        match self {
            Self::WorkingResults => 3_600,
            Self::StagedPatterns => 86_400,
            Self::Coordination => 300,
            Self::ConflictContext => 604_800,
            Self::Session => 1_800,
            Self::StreamEntry => 604_800,
            Self::TaskQueue => 14_400,
        }
    }

    pub fn default_duration(self) -> Duration {
        Duration::from_secs(self.default_secs())
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::WorkingResults => "working_results",
            Self::StagedPatterns => "staged_patterns",
            Self::Coordination => "coordination",
            Self::ConflictContext => "conflict_context",
            Self::Session => "session",
            Self::StreamEntry => "stream_entry",
            Self::TaskQueue => "task_queue",
        }
    }
}
