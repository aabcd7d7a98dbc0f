//! Agent credentials and the tiered permission model.
//!
//! # Examples
//!
//! ```
//! use empathy_core::models::{AccessTier, AgentCredentials};
//!
//! let creds = AgentCredentials::new("reviewer", AccessTier::Validator);
//! assert!(creds.can_stage());
//! assert!(creds.can_validate());
//! assert!(!creds.can_administer());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{MemoryError, MemoryResult};

/// Permission level of an agent. Tiers form a total order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessTier {
    /// Read-only access.
    Observer = 1,
    /// May stash working data, stage patterns, push tasks.
    Contributor = 2,
    /// May promote/reject patterns and resolve conflicts.
    Validator = 3,
    /// Full administrative access.
    Steward = 4,
}

impl AccessTier {
    pub fn level(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Observer => "OBSERVER",
            Self::Contributor => "CONTRIBUTOR",
            Self::Validator => "VALIDATOR",
            Self::Steward => "STEWARD",
        }
    }

    /// Parse a tier from its name (case-insensitive) or numeric level.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "OBSERVER" | "1" => Some(Self::Observer),
            "CONTRIBUTOR" | "2" => Some(Self::Contributor),
            "VALIDATOR" | "3" => Some(Self::Validator),
            "STEWARD" | "4" => Some(Self::Steward),
            _ => None,
        }
    }
}

impl fmt::Display for AccessTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Caller-supplied identity for a single operation. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentCredentials {
    pub agent_id: String,
    pub tier: AccessTier,
}

impl AgentCredentials {
    pub fn new(agent_id: impl Into<String>, tier: AccessTier) -> Self {
        Self {
            agent_id: agent_id.into(),
            tier,
        }
    }

    /// Contributor or higher.
    pub fn can_stage(&self) -> bool {
        self.tier >= AccessTier::Contributor
    }

    /// Validator or higher.
    pub fn can_validate(&self) -> bool {
        self.tier >= AccessTier::Validator
    }

    pub fn can_administer(&self) -> bool {
        self.tier >= AccessTier::Steward
    }

    /// Fail with [`MemoryError::PermissionDenied`] unless the tier reaches `required`.
    pub fn require(&self, required: AccessTier) -> MemoryResult<()> {
        if self.tier >= required {
            Ok(())
        } else {
            Err(MemoryError::PermissionDenied {
                agent_id: self.agent_id.clone(),
                tier: self.tier,
                required,
            })
        }
    }
}
