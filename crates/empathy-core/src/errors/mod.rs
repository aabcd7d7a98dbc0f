mod memory_error;
mod sanitize_error;
mod store_error;

pub use memory_error::MemoryError;
pub use sanitize_error::SanitizeError;
pub use store_error::StoreError;

/// Convenience alias used by every manager.
pub type MemoryResult<T> = Result<T, MemoryError>;

/// Result type returned by [`crate::traits::IKeyValueStore`] implementations.
pub type StoreResult<T> = Result<T, StoreError>;
