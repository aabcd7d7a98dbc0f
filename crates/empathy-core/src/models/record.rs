//! Wire envelopes for working memory and queue entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The envelope written for every working-memory stash.
///
/// Writes always replace the whole envelope; it is never partially updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub data: serde_json::Value,
    pub agent_id: String,
    pub stashed_at: DateTime<Utc>,
}

impl StoredRecord {
    pub fn new(data: serde_json::Value, agent_id: impl Into<String>) -> Self {
        Self {
            data,
            agent_id: agent_id.into(),
            stashed_at: Utc::now(),
        }
    }
}

/// A task payload wrapped with its provenance before it enters a queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub task_id: String,
    pub task: serde_json::Value,
    pub queued_by: String,
    pub queued_at: DateTime<Utc>,
}

impl QueueEntry {
    pub fn new(task: serde_json::Value, queued_by: impl Into<String>) -> Self {
        Self {
            task_id: uuid::Uuid::new_v4().to_string(),
            task,
            queued_by: queued_by.into(),
            queued_at: Utc::now(),
        }
    }
}
