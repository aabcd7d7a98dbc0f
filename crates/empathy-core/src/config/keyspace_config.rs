use serde::{Deserialize, Serialize};

use super::defaults;

/// Key prefixes for every record class.
///
/// The defaults are the wire contract shared with every other implementation
/// of this layer; change them only for isolated test deployments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyspaceConfig {
    pub working_prefix: String,
    pub staged_prefix: String,
    pub conflict_prefix: String,
    pub session_prefix: String,
    pub signal_prefix: String,
    pub queue_prefix: String,
    pub stream_prefix: String,
    pub timeline_prefix: String,
}

impl Default for KeyspaceConfig {
    fn default() -> Self {
        Self {
            working_prefix: defaults::DEFAULT_WORKING_PREFIX.to_string(),
            staged_prefix: defaults::DEFAULT_STAGED_PREFIX.to_string(),
            conflict_prefix: defaults::DEFAULT_CONFLICT_PREFIX.to_string(),
            session_prefix: defaults::DEFAULT_SESSION_PREFIX.to_string(),
            signal_prefix: defaults::DEFAULT_SIGNAL_PREFIX.to_string(),
            queue_prefix: defaults::DEFAULT_QUEUE_PREFIX.to_string(),
            stream_prefix: defaults::DEFAULT_STREAM_PREFIX.to_string(),
            timeline_prefix: defaults::DEFAULT_TIMELINE_PREFIX.to_string(),
        }
    }
}
