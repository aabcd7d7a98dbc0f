use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A short-lived coordination message between agents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub signal_type: String,
    pub source_agent: String,
    /// `None` for broadcasts.
    #[serde(default)]
    pub target_agent: Option<String>,
    pub data: serde_json::Value,
    pub sent_at: DateTime<Utc>,
}
