//! Time-ordered events and the windows used to query them.

use serde::{Deserialize, Serialize};

use crate::errors::{MemoryError, MemoryResult};

/// An event stored in a timeline, scored by `timestamp` (unix seconds).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub event_id: String,
    pub data: serde_json::Value,
    pub agent_id: String,
    pub timestamp: f64,
}

/// Inclusive score range with paging applied after range filtering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: f64,
    pub end: f64,
    #[serde(default)]
    pub offset: usize,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl TimeWindow {
    pub fn between(start: f64, end: f64) -> Self {
        Self {
            start,
            end,
            offset: 0,
            limit: None,
        }
    }

    /// The unbounded window.
    pub fn all() -> Self {
        Self::between(f64::NEG_INFINITY, f64::INFINITY)
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn validate(&self) -> MemoryResult<()> {
        if self.start.is_nan() || self.end.is_nan() {
            return Err(MemoryError::validation("time window bounds cannot be NaN"));
        }
        Ok(())
    }
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self::all()
    }
}
