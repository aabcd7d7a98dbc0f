//! Reviewable patterns awaiting promotion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{MemoryError, MemoryResult};

/// A pattern staged for validator review.
///
/// Lifecycle: staged, then either promoted (handed to the caller for durable
/// storage elsewhere) or rejected. A resubmission is a new record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagedPattern {
    pub pattern_id: String,
    /// Agent that discovered the pattern. Overwritten with the stager's id.
    #[serde(default)]
    pub agent_id: String,
    #[serde(default)]
    pub pattern_type: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default)]
    pub context: serde_json::Map<String, serde_json::Value>,
    pub confidence: f64,
    #[serde(default = "Utc::now")]
    pub staged_at: DateTime<Utc>,
    #[serde(default)]
    pub interests: Vec<String>,
}

impl StagedPattern {
    pub fn new(pattern_id: impl Into<String>, name: impl Into<String>, confidence: f64) -> Self {
        Self {
            pattern_id: pattern_id.into(),
            agent_id: String::new(),
            pattern_type: String::new(),
            name: name.into(),
            description: String::new(),
            code: None,
            context: serde_json::Map::new(),
            confidence,
            staged_at: Utc::now(),
            interests: Vec::new(),
        }
    }

    pub fn with_type(mut self, pattern_type: impl Into<String>) -> Self {
        self.pattern_type = pattern_type.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Reject empty ids and confidences outside `[0.0, 1.0]` (NaN included).
    pub fn validate(&self) -> MemoryResult<()> {
        if self.pattern_id.trim().is_empty() {
            return Err(MemoryError::validation("pattern_id cannot be empty"));
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(MemoryError::validation(format!(
                "confidence must be between 0.0 and 1.0, got {}",
                self.confidence
            )));
        }
        Ok(())
    }
}
