//! Structured negotiation context for conflicts between agents.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Positions, interests, and the eventual resolution of one conflict.
///
/// Resolution marks the record resolved; it is never deleted by this layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictContext {
    pub conflict_id: String,
    /// Agent id to the stance that agent holds.
    pub positions: BTreeMap<String, String>,
    /// Agent id to the underlying interests behind its stance.
    pub interests: BTreeMap<String, Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batna: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub resolved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
}

impl ConflictContext {
    pub fn new(
        conflict_id: impl Into<String>,
        positions: BTreeMap<String, String>,
        interests: BTreeMap<String, Vec<String>>,
        created_by: impl Into<String>,
        batna: Option<String>,
    ) -> Self {
        Self {
            conflict_id: conflict_id.into(),
            positions,
            interests,
            batna,
            created_by: created_by.into(),
            created_at: Utc::now(),
            resolved: false,
            resolution: None,
            resolved_by: None,
            resolved_at: None,
        }
    }

    pub fn resolve(&mut self, resolution: impl Into<String>, resolved_by: impl Into<String>) {
        self.resolved = true;
        self.resolution = Some(resolution.into());
        self.resolved_by = Some(resolved_by.into());
        self.resolved_at = Some(Utc::now());
    }

    /// Agents holding a position in this conflict.
    pub fn parties(&self) -> Vec<&str> {
        self.positions.keys().map(String::as_str).collect()
    }
}
