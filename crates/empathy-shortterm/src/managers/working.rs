//! Per-agent scratch data with TTL.

use std::sync::Arc;

use empathy_core::config::TtlConfig;
use empathy_core::errors::MemoryResult;
use empathy_core::models::{AccessTier, AgentCredentials, StoredRecord, TtlStrategy};
use empathy_core::traits::{IDataSanitizer, StoreOp};
use empathy_observability::memory_op_span;

use crate::context::{sanitize, OrDegraded, StoreContext};
use crate::keys::{require_id, AgentNamespace};

/// Options for [`WorkingMemory::stash_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StashOptions {
    pub ttl: TtlStrategy,
    pub skip_sanitization: bool,
}

impl Default for StashOptions {
    fn default() -> Self {
        Self {
            ttl: TtlStrategy::WorkingResults,
            skip_sanitization: false,
        }
    }
}

/// Stash and retrieve data under `working:{agent_id}:{key}`.
///
/// Reads default to the caller's own namespace; another agent's data is only
/// visible when its id is passed explicitly.
pub struct WorkingMemory {
    ctx: StoreContext,
    ns: AgentNamespace,
    ttl: TtlConfig,
    sanitizer: Option<Arc<dyn IDataSanitizer>>,
}

impl WorkingMemory {
    pub fn new(
        ctx: StoreContext,
        prefix: impl Into<String>,
        ttl: TtlConfig,
        sanitizer: Option<Arc<dyn IDataSanitizer>>,
    ) -> Self {
        Self {
            ctx,
            ns: AgentNamespace::new(prefix),
            ttl,
            sanitizer,
        }
    }

    pub fn stash(
        &self,
        key: &str,
        data: &serde_json::Value,
        creds: &AgentCredentials,
    ) -> MemoryResult<bool> {
        self.stash_with(key, data, creds, StashOptions::default())
    }

    /// Write `data` for the caller.
    ///
    /// Fails before touching the store on an empty key, a tier below
    /// CONTRIBUTOR, or (unless skipped) a payload containing secrets.
    /// Returns false when the store is unavailable.
    pub fn stash_with(
        &self,
        key: &str,
        data: &serde_json::Value,
        creds: &AgentCredentials,
        options: StashOptions,
    ) -> MemoryResult<bool> {
        let _timer = self.ctx.timer("stash");
        let _span = memory_op_span!("stash", creds.agent_id, key).entered();
        require_id("key", key)?;
        creds.require(AccessTier::Contributor)?;

        let data = if options.skip_sanitization {
            data.clone()
        } else {
            sanitize(self.sanitizer.as_deref(), data, &creds.agent_id, key)?
        };

        let full_key = self.ns.key(&creds.agent_id, key);
        let record = StoredRecord::new(data, creds.agent_id.clone());
        self.ctx
            .write_json(&full_key, &record, self.ttl.resolve(options.ttl))
            .or_degraded("stash", false)
    }

    /// The payload stashed under `key` by `agent_id` (default: the caller).
    pub fn retrieve(
        &self,
        key: &str,
        creds: &AgentCredentials,
        agent_id: Option<&str>,
    ) -> MemoryResult<Option<serde_json::Value>> {
        let _timer = self.ctx.timer("retrieve");
        require_id("key", key)?;
        let owner = agent_id.unwrap_or(&creds.agent_id);
        require_id("agent_id", owner)?;

        let full_key = self.ns.key(owner, key);
        let record: Option<StoredRecord> = self
            .ctx
            .read_json(&full_key)
            .or_degraded("retrieve", None)?;
        tracing::debug!(agent_id = %creds.agent_id, owner = %owner, key = %key, hit = record.is_some(), "retrieve");
        Ok(record.map(|r| r.data))
    }

    /// Delete everything in the caller's namespace. Returns the count deleted.
    pub fn clear(&self, creds: &AgentCredentials) -> MemoryResult<usize> {
        let _timer = self.ctx.timer("clear");
        let deleted = self.clear_inner(creds).or_degraded("clear", 0)?;
        tracing::info!(agent_id = %creds.agent_id, deleted, "cleared working memory");
        Ok(deleted)
    }

    fn clear_inner(&self, creds: &AgentCredentials) -> MemoryResult<usize> {
        let keys = self.ctx.scan_all(&self.ns.pattern(&creds.agent_id))?;
        if keys.is_empty() {
            return Ok(0);
        }
        let ops: Vec<StoreOp> = keys.into_iter().map(StoreOp::delete).collect();
        let results = self.ctx.store().pipeline_execute(&ops)?;
        Ok(results.into_iter().filter(|&deleted| deleted).count())
    }

    pub fn exists(&self, key: &str, creds: &AgentCredentials) -> MemoryResult<bool> {
        require_id("key", key)?;
        let full_key = self.ns.key(&creds.agent_id, key);
        self.ctx
            .store()
            .exists(&full_key)
            .or_degraded("exists", false)
    }

    /// The caller's keys, without the namespace prefix, sorted.
    pub fn list_keys(&self, creds: &AgentCredentials) -> MemoryResult<Vec<String>> {
        let _timer = self.ctx.timer("list_keys");
        let keys = self
            .ctx
            .scan_all(&self.ns.pattern(&creds.agent_id))
            .or_degraded("list_keys", Vec::new())?;
        Ok(keys
            .iter()
            .filter_map(|k| self.ns.user_key(&creds.agent_id, k))
            .map(str::to_string)
            .collect())
    }
}
