/// Failure reported by an [`crate::traits::IDataSanitizer`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SanitizeError {
    /// Hard secrets were found. Storage must be refused.
    #[error("{count} secret(s) detected: {kinds:?}")]
    SecretsDetected { count: usize, kinds: Vec<String> },
}
