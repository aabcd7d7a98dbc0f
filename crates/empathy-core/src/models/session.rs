//! Multi-agent collaboration sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A collaboration session and its participant set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    /// Participant agent ids in join order, without duplicates.
    pub participants: Vec<String>,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl Session {
    pub fn new(
        session_id: impl Into<String>,
        created_by: impl Into<String>,
        metadata: serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        let created_by = created_by.into();
        Self {
            session_id: session_id.into(),
            participants: vec![created_by.clone()],
            created_by,
            created_at: Utc::now(),
            metadata,
        }
    }

    pub fn is_participant(&self, agent_id: &str) -> bool {
        self.participants.iter().any(|p| p == agent_id)
    }

    /// Add a participant. Returns false when the agent was already present.
    pub fn add_participant(&mut self, agent_id: &str) -> bool {
        if self.is_participant(agent_id) {
            return false;
        }
        self.participants.push(agent_id.to_string());
        true
    }

    /// Remove a participant. Returns false when the agent was not present.
    pub fn remove_participant(&mut self, agent_id: &str) -> bool {
        let before = self.participants.len();
        self.participants.retain(|p| p != agent_id);
        self.participants.len() != before
    }
}
