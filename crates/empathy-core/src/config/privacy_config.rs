use serde::{Deserialize, Serialize};

use super::defaults;

/// Privacy subsystem configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrivacyConfig {
    /// Run the sanitizer on stashed data. Individual calls may still skip it.
    pub enabled: bool,
}

impl Default for PrivacyConfig {
    fn default() -> Self {
        Self {
            enabled: defaults::DEFAULT_PRIVACY_ENABLED,
        }
    }
}
