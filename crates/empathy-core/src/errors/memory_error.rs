use crate::models::AccessTier;

use super::{SanitizeError, StoreError};

/// Top-level error for every short-term memory operation.
///
/// Validation and permission failures are raised before the store is touched.
/// Store failures are usually absorbed into degraded results by the managers
/// and only surface from the lower-level helpers.
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    #[error("validation failed: {0}")]
    ValidationError(String),

    #[error("permission denied: agent {agent_id} has tier {tier}, requires {required} or higher")]
    PermissionDenied {
        agent_id: String,
        tier: AccessTier,
        required: AccessTier,
    },

    #[error("security violation: {count} secret(s) detected ({kinds:?}), storage refused")]
    SecurityViolation { count: usize, kinds: Vec<String> },

    #[error("corrupted record at {key}: {reason}")]
    Corrupted { key: String, reason: String },

    #[error("store error: {0}")]
    StoreError(StoreError),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("config error: {0}")]
    ConfigError(String),
}

impl MemoryError {
    /// Shorthand for a [`MemoryError::ValidationError`].
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::ValidationError(reason.into())
    }

    /// True for failures caused by the backing store rather than the caller.
    pub fn is_backend(&self) -> bool {
        matches!(self, Self::StoreError(_))
    }

    /// True when the store could not be reached. Managers degrade only on these.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::StoreError(e) if e.is_unavailable())
    }
}

/// Records of the wrong kind and unparseable stream ids are data faults, so
/// they become [`MemoryError::Corrupted`]. Everything else stays a store error.
impl From<StoreError> for MemoryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::WrongType { key } => Self::Corrupted {
                key,
                reason: "holds the wrong kind of value".to_string(),
            },
            StoreError::InvalidStreamId(id) => Self::Corrupted {
                key: id,
                reason: "not a valid stream entry id".to_string(),
            },
            other => Self::StoreError(other),
        }
    }
}

impl From<SanitizeError> for MemoryError {
    fn from(err: SanitizeError) -> Self {
        match err {
            SanitizeError::SecretsDetected { count, kinds } => {
                Self::SecurityViolation { count, kinds }
            }
        }
    }
}
