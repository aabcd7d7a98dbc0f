//! Pipelined bulk stash and retrieve over the working-memory namespace.

use std::collections::BTreeMap;
use std::sync::Arc;

use empathy_core::config::TtlConfig;
use empathy_core::errors::{MemoryError, MemoryResult};
use empathy_core::models::{AccessTier, AgentCredentials, StoredRecord, TtlStrategy};
use empathy_core::traits::{IDataSanitizer, StoreOp};

use crate::context::{decode, sanitize, OrDegraded, StoreContext};
use crate::keys::{require_id, AgentNamespace};

pub struct BatchOperations {
    ctx: StoreContext,
    ns: AgentNamespace,
    ttl: TtlConfig,
    max_batch_size: usize,
    sanitizer: Option<Arc<dyn IDataSanitizer>>,
}

impl BatchOperations {
    pub fn new(
        ctx: StoreContext,
        prefix: impl Into<String>,
        ttl: TtlConfig,
        max_batch_size: usize,
        sanitizer: Option<Arc<dyn IDataSanitizer>>,
    ) -> Self {
        Self {
            ctx,
            ns: AgentNamespace::new(prefix),
            ttl,
            max_batch_size,
            sanitizer,
        }
    }

    /// Write every item in one atomic pipeline. Returns the number set.
    ///
    /// All items are validated and sanitized before anything is written, so
    /// a secret in any item leaves the store untouched. Empty input is a
    /// no-op returning 0.
    pub fn stash_batch(
        &self,
        items: &[(String, serde_json::Value)],
        creds: &AgentCredentials,
        ttl: TtlStrategy,
    ) -> MemoryResult<usize> {
        self.stash_batch_with(items, creds, ttl, false)
    }

    pub fn stash_batch_with(
        &self,
        items: &[(String, serde_json::Value)],
        creds: &AgentCredentials,
        ttl: TtlStrategy,
        skip_sanitization: bool,
    ) -> MemoryResult<usize> {
        let _timer = self.ctx.timer("stash_batch");
        creds.require(AccessTier::Contributor)?;
        if items.is_empty() {
            return Ok(0);
        }
        if items.len() > self.max_batch_size {
            return Err(MemoryError::validation(format!(
                "batch of {} items exceeds the limit of {}",
                items.len(),
                self.max_batch_size
            )));
        }

        let ttl = Some(self.ttl.resolve(ttl));
        let mut ops = Vec::with_capacity(items.len());
        for (key, data) in items {
            require_id("key", key)?;
            let data = if skip_sanitization {
                data.clone()
            } else {
                sanitize(self.sanitizer.as_deref(), data, &creds.agent_id, key)?
            };
            let record = StoredRecord::new(data, creds.agent_id.clone());
            ops.push(StoreOp::set(
                self.ns.key(&creds.agent_id, key),
                serde_json::to_string(&record)?,
                ttl,
            ));
        }

        let written = self
            .ctx
            .store()
            .pipeline_execute(&ops)
            .map(|results| results.into_iter().filter(|ok| *ok).count())
            .or_degraded("stash_batch", 0)?;
        tracing::debug!(agent_id = %creds.agent_id, requested = items.len(), written, "stash_batch");
        Ok(written)
    }

    /// One `mget` for all keys. Missing or expired keys are absent from the
    /// result, never present with a null value.
    pub fn retrieve_batch(
        &self,
        keys: &[String],
        creds: &AgentCredentials,
        agent_id: Option<&str>,
    ) -> MemoryResult<BTreeMap<String, serde_json::Value>> {
        let _timer = self.ctx.timer("retrieve_batch");
        if keys.is_empty() {
            return Ok(BTreeMap::new());
        }
        let owner = agent_id.unwrap_or(&creds.agent_id);
        for key in keys {
            require_id("key", key)?;
        }

        let full_keys: Vec<String> = keys.iter().map(|k| self.ns.key(owner, k)).collect();
        let values = self
            .ctx
            .store()
            .mget(&full_keys)
            .or_degraded("retrieve_batch", Vec::new())?;

        let mut out = BTreeMap::new();
        for ((key, full_key), raw) in keys.iter().zip(&full_keys).zip(values) {
            if let Some(raw) = raw {
                let record: StoredRecord = decode(full_key, &raw)?;
                out.insert(key.clone(), record.data);
            }
        }
        Ok(out)
    }
}
