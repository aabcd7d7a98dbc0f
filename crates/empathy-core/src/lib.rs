//! # empathy-core
//!
//! Foundation crate for the Empathy short-term memory layer.
//! Defines the credentials, records, store/sanitizer/metrics traits, errors,
//! config, and constants. Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::MemoryConfig;
pub use errors::{MemoryError, MemoryResult, StoreError, StoreResult};
pub use models::{AccessTier, AgentCredentials, TtlStrategy};
