use serde::{Deserialize, Serialize};

use crate::errors::SanitizeError;

/// Sanitized payload plus the number of PII redactions applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SanitizedData {
    pub data: serde_json::Value,
    pub pii_count: usize,
}

/// Scrubs PII and blocks secrets before data is persisted.
///
/// The sanitizer is the authority on secrets: when it returns
/// [`SanitizeError::SecretsDetected`] the caller must not store anything.
pub trait IDataSanitizer: Send + Sync {
    fn sanitize(&self, data: &serde_json::Value) -> Result<SanitizedData, SanitizeError>;
}
