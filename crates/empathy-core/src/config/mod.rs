//! Layered configuration, loadable from TOML.

pub mod defaults;
mod keyspace_config;
mod limits_config;
mod observability_config;
mod privacy_config;
mod store_config;
mod ttl_config;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use keyspace_config::KeyspaceConfig;
pub use limits_config::LimitsConfig;
pub use observability_config::ObservabilityConfig;
pub use privacy_config::PrivacyConfig;
pub use store_config::{StoreBackend, StoreConfig};
pub use ttl_config::TtlConfig;

use crate::errors::{MemoryError, MemoryResult};

/// Top-level configuration. Every section is optional in TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    pub store: StoreConfig,
    pub ttl: TtlConfig,
    pub keyspace: KeyspaceConfig,
    pub limits: LimitsConfig,
    pub privacy: PrivacyConfig,
    pub observability: ObservabilityConfig,
}

impl MemoryConfig {
    /// Parse and validate a TOML document. Missing fields take defaults.
    pub fn from_toml(toml_str: &str) -> MemoryResult<Self> {
        let config: Self =
            toml::from_str(toml_str).map_err(|e| MemoryError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> MemoryResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            MemoryError::ConfigError(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml(&raw)
    }

    pub fn validate(&self) -> MemoryResult<()> {
        if self.store.backend == StoreBackend::Redis && self.store.redis_url.trim().is_empty() {
            return Err(MemoryError::ConfigError(
                "store.redis_url is required for the redis backend".into(),
            ));
        }
        if self.store.pool_size == 0 {
            return Err(MemoryError::ConfigError("store.pool_size must be > 0".into()));
        }
        if self.limits.default_page_size == 0 {
            return Err(MemoryError::ConfigError(
                "limits.default_page_size must be > 0".into(),
            ));
        }
        if self.limits.max_batch_size == 0 {
            return Err(MemoryError::ConfigError(
                "limits.max_batch_size must be > 0".into(),
            ));
        }
        if self.limits.default_stream_max_len == 0 {
            return Err(MemoryError::ConfigError(
                "limits.default_stream_max_len must be > 0".into(),
            ));
        }
        if let Some(strategy) = self.ttl.zero_override() {
            return Err(MemoryError::ConfigError(format!(
                "ttl override for {strategy:?} must be > 0"
            )));
        }
        Ok(())
    }
}
