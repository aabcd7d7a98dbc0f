//! Key namespacing.
//!
//! Keys are `{prefix}{id}`; working memory adds the owning agent:
//! `{prefix}{agent_id}:{key}`. Ids are validated before any key is built.

use empathy_core::constants::MAX_KEY_LENGTH;
use empathy_core::errors::{MemoryError, MemoryResult};

/// Reject empty (or whitespace-only) and over-long ids.
pub fn require_id(field: &str, value: &str) -> MemoryResult<()> {
    if value.trim().is_empty() {
        return Err(MemoryError::validation(format!("{field} cannot be empty")));
    }
    if value.len() > MAX_KEY_LENGTH {
        return Err(MemoryError::validation(format!(
            "{field} exceeds {MAX_KEY_LENGTH} bytes"
        )));
    }
    Ok(())
}

/// Escape glob metacharacters so a literal prefix can head a scan pattern.
pub fn escape_glob(literal: &str) -> String {
    let mut out = String::with_capacity(literal.len());
    for c in literal.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// A flat namespace: `{prefix}{id}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    prefix: String,
}

impl Namespace {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn key(&self, id: &str) -> String {
        format!("{}{}", self.prefix, id)
    }

    /// Glob matching every key in the namespace.
    pub fn pattern(&self) -> String {
        format!("{}*", escape_glob(&self.prefix))
    }

    /// Glob matching keys whose id starts with `id_prefix`.
    pub fn pattern_under(&self, id_prefix: &str) -> String {
        format!("{}{}*", escape_glob(&self.prefix), escape_glob(id_prefix))
    }

    /// The id part of a key in this namespace.
    pub fn id_of<'a>(&self, key: &'a str) -> Option<&'a str> {
        key.strip_prefix(self.prefix.as_str())
    }
}

/// Per-agent namespace: `{prefix}{agent_id}:{key}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentNamespace {
    inner: Namespace,
}

impl AgentNamespace {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            inner: Namespace::new(prefix),
        }
    }

    pub fn key(&self, agent_id: &str, key: &str) -> String {
        format!("{}{}:{}", self.inner.prefix, agent_id, key)
    }

    pub fn pattern(&self, agent_id: &str) -> String {
        self.inner.pattern_under(&format!("{agent_id}:"))
    }

    /// The caller-visible key part of a full key owned by `agent_id`.
    pub fn user_key<'a>(&self, agent_id: &str, full: &'a str) -> Option<&'a str> {
        self.inner
            .id_of(full)?
            .strip_prefix(agent_id)?
            .strip_prefix(':')
    }
}
