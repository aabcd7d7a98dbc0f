use serde::{Deserialize, Serialize};

use super::defaults;

/// Which backing store to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Redis,
}

/// Backing store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// "memory" or "redis".
    pub backend: StoreBackend,
    pub redis_url: String,
    pub connect_timeout_ms: u64,
    /// Idle connections kept by the networked store.
    pub pool_size: usize,
    /// Fall back to the in-process store when the networked store cannot connect.
    pub fallback_to_memory: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            redis_url: defaults::DEFAULT_REDIS_URL.to_string(),
            connect_timeout_ms: defaults::DEFAULT_CONNECT_TIMEOUT_MS,
            pool_size: defaults::DEFAULT_POOL_SIZE,
            fallback_to_memory: defaults::DEFAULT_FALLBACK_TO_MEMORY,
        }
    }
}
