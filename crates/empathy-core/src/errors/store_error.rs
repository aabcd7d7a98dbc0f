/// Errors raised by a backing key-value store.
///
/// Only [`StoreError::Unavailable`] and [`StoreError::Backend`] count as a
/// degraded backend. The other variants describe the data or the process
/// and always reach the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store backend error: {0}")]
    Backend(String),

    #[error("WRONGTYPE operation against key {key} holding the wrong kind of value")]
    WrongType { key: String },

    #[error("invalid stream id: {0}")]
    InvalidStreamId(String),

    #[error("store lock poisoned: {0}")]
    LockPoisoned(String),
}

impl StoreError {
    /// True when the backend could not serve the request at all.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Backend(_))
    }
}
