//! Stage → promote/reject lifecycle for reviewable patterns.

use std::time::Duration;

use moka::sync::Cache;

use empathy_core::config::TtlConfig;
use empathy_core::errors::MemoryResult;
use empathy_core::models::{AccessTier, AgentCredentials, StagedPattern, TtlStrategy};

use crate::context::{OrDegraded, StoreContext};
use crate::keys::{require_id, Namespace};

/// Read-through cache of staged patterns, keyed by pattern id.
///
/// A hit only saves the fetch and decode. Every hit is checked against the
/// store first, so a pattern removed or expired elsewhere reads as absent.
/// Shared between [`PatternStaging`] and the transaction manager so a
/// promotion through either invalidates the same entries. A capacity of 0
/// disables caching.
#[derive(Clone)]
pub struct PatternCache {
    inner: Option<Cache<String, StagedPattern>>,
}

impl PatternCache {
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        let inner = (capacity > 0).then(|| {
            Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build()
        });
        Self { inner }
    }

    pub fn disabled() -> Self {
        Self { inner: None }
    }

    pub fn get(&self, pattern_id: &str) -> Option<StagedPattern> {
        self.inner.as_ref()?.get(pattern_id)
    }

    pub fn insert(&self, pattern: &StagedPattern) {
        if let Some(cache) = &self.inner {
            cache.insert(pattern.pattern_id.clone(), pattern.clone());
        }
    }

    pub fn invalidate(&self, pattern_id: &str) {
        if let Some(cache) = &self.inner {
            cache.invalidate(pattern_id);
        }
    }

    pub fn contains(&self, pattern_id: &str) -> bool {
        self.inner
            .as_ref()
            .is_some_and(|c| c.contains_key(pattern_id))
    }
}

/// Patterns awaiting validator review under `empathy:staged:{pattern_id}`.
///
/// `promote_pattern` and `reject_pattern` are plain get-then-delete. Use
/// [`crate::TransactionManager::atomic_promote_pattern`] when several
/// validators may race on the same pattern.
pub struct PatternStaging {
    ctx: StoreContext,
    ns: Namespace,
    ttl: TtlConfig,
    cache: PatternCache,
}

impl PatternStaging {
    pub fn new(
        ctx: StoreContext,
        prefix: impl Into<String>,
        ttl: TtlConfig,
        cache: PatternCache,
    ) -> Self {
        Self {
            ctx,
            ns: Namespace::new(prefix),
            ttl,
            cache,
        }
    }

    pub fn cache(&self) -> &PatternCache {
        &self.cache
    }

    pub fn namespace(&self) -> &Namespace {
        &self.ns
    }

    /// Stage `pattern` for review. The stored `agent_id` and `staged_at` are
    /// the caller's and now. Re-staging an id replaces the previous record.
    pub fn stage_pattern(
        &self,
        mut pattern: StagedPattern,
        creds: &AgentCredentials,
    ) -> MemoryResult<bool> {
        let _timer = self.ctx.timer("stage_pattern");
        creds.require(AccessTier::Contributor)?;
        pattern.validate()?;
        require_id("pattern_id", &pattern.pattern_id)?;

        pattern.agent_id = creds.agent_id.clone();
        pattern.staged_at = chrono::Utc::now();
        let key = self.ns.key(&pattern.pattern_id);
        let written = self
            .ctx
            .write_json(&key, &pattern, self.ttl.resolve(TtlStrategy::StagedPatterns))
            .or_degraded("stage_pattern", false)?;
        self.cache.invalidate(&pattern.pattern_id);
        if written {
            tracing::info!(
                agent_id = %creds.agent_id,
                pattern_id = %pattern.pattern_id,
                confidence = pattern.confidence,
                "pattern staged"
            );
        }
        Ok(written)
    }

    pub fn get_staged_pattern(
        &self,
        pattern_id: &str,
        _creds: &AgentCredentials,
    ) -> MemoryResult<Option<StagedPattern>> {
        let _timer = self.ctx.timer("get_staged_pattern");
        require_id("pattern_id", pattern_id)?;
        let key = self.ns.key(pattern_id);
        if let Some(hit) = self.cache.get(pattern_id) {
            // Liveness comes from the store; another process may have removed it.
            let live = self
                .ctx
                .store()
                .exists(&key)
                .or_degraded("get_staged_pattern", false)?;
            if live {
                return Ok(Some(hit));
            }
            self.cache.invalidate(pattern_id);
            return Ok(None);
        }
        let pattern: Option<StagedPattern> = self
            .ctx
            .read_json(&key)
            .or_degraded("get_staged_pattern", None)?;
        if let Some(p) = &pattern {
            self.cache.insert(p);
        }
        Ok(pattern)
    }

    /// Every staged pattern, ordered by pattern id.
    pub fn list_staged_patterns(
        &self,
        _creds: &AgentCredentials,
    ) -> MemoryResult<Vec<StagedPattern>> {
        let _timer = self.ctx.timer("list_staged_patterns");
        let records = self
            .list_inner()
            .or_degraded("list_staged_patterns", Vec::new())?;
        Ok(records)
    }

    fn list_inner(&self) -> MemoryResult<Vec<StagedPattern>> {
        let keys = self.ctx.scan_all(&self.ns.pattern())?;
        let mut patterns: Vec<StagedPattern> = self
            .ctx
            .read_all_json(&keys)?
            .into_iter()
            .map(|(_, p)| p)
            .collect();
        patterns.sort_by(|a, b| a.pattern_id.cmp(&b.pattern_id));
        Ok(patterns)
    }

    /// Remove a staged pattern and hand it to the caller for durable storage.
    /// `None` when nothing is staged under `pattern_id`.
    pub fn promote_pattern(
        &self,
        pattern_id: &str,
        creds: &AgentCredentials,
    ) -> MemoryResult<Option<StagedPattern>> {
        let _timer = self.ctx.timer("promote_pattern");
        require_id("pattern_id", pattern_id)?;
        creds.require(AccessTier::Validator)?;

        let promoted = self
            .promote_inner(pattern_id)
            .or_degraded("promote_pattern", None)?;
        self.cache.invalidate(pattern_id);
        if promoted.is_some() {
            tracing::info!(agent_id = %creds.agent_id, pattern_id = %pattern_id, "pattern promoted");
        }
        Ok(promoted)
    }

    fn promote_inner(&self, pattern_id: &str) -> MemoryResult<Option<StagedPattern>> {
        let key = self.ns.key(pattern_id);
        let Some(pattern) = self.ctx.read_json::<StagedPattern>(&key)? else {
            return Ok(None);
        };
        self.ctx.store().delete(&key)?;
        Ok(Some(pattern))
    }

    /// Drop a staged pattern. Returns whether one was staged.
    pub fn reject_pattern(
        &self,
        pattern_id: &str,
        creds: &AgentCredentials,
        reason: &str,
    ) -> MemoryResult<bool> {
        let _timer = self.ctx.timer("reject_pattern");
        require_id("pattern_id", pattern_id)?;
        creds.require(AccessTier::Validator)?;

        let removed = self
            .ctx
            .store()
            .delete(&self.ns.key(pattern_id))
            .or_degraded("reject_pattern", false)?;
        self.cache.invalidate(pattern_id);
        if removed {
            tracing::info!(agent_id = %creds.agent_id, pattern_id = %pattern_id, reason = %reason, "pattern rejected");
        }
        Ok(removed)
    }
}
