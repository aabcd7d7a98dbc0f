//! Structured conflict negotiation contexts.

use std::collections::BTreeMap;

use empathy_core::config::TtlConfig;
use empathy_core::errors::{MemoryError, MemoryResult};
use empathy_core::models::{AccessTier, AgentCredentials, ConflictContext, TtlStrategy};

use crate::context::{OrDegraded, StoreContext};
use crate::keys::{require_id, Namespace};

/// Conflicts under `empathy:conflict:{conflict_id}`.
///
/// Resolving keeps the record as an audit trail and renews its TTL.
pub struct ConflictNegotiation {
    ctx: StoreContext,
    ns: Namespace,
    ttl: TtlConfig,
}

impl ConflictNegotiation {
    pub fn new(ctx: StoreContext, prefix: impl Into<String>, ttl: TtlConfig) -> Self {
        Self {
            ctx,
            ns: Namespace::new(prefix),
            ttl,
        }
    }

    pub fn create_conflict_context(
        &self,
        conflict_id: &str,
        positions: BTreeMap<String, String>,
        interests: BTreeMap<String, Vec<String>>,
        creds: &AgentCredentials,
        batna: Option<String>,
    ) -> MemoryResult<bool> {
        let _timer = self.ctx.timer("create_conflict_context");
        require_id("conflict_id", conflict_id)?;
        if let Some(agent) = positions.keys().find(|a| a.trim().is_empty()) {
            return Err(MemoryError::validation(format!(
                "position agent ids cannot be empty, got {agent:?}"
            )));
        }
        creds.require(AccessTier::Contributor)?;

        let context = ConflictContext::new(
            conflict_id,
            positions,
            interests,
            creds.agent_id.clone(),
            batna,
        );
        let written = self
            .ctx
            .write_json(
                &self.ns.key(conflict_id),
                &context,
                self.ttl.resolve(TtlStrategy::ConflictContext),
            )
            .or_degraded("create_conflict_context", false)?;
        if written {
            tracing::info!(
                agent_id = %creds.agent_id,
                conflict_id = %conflict_id,
                parties = ?context.parties(),
                "conflict context created"
            );
        }
        Ok(written)
    }

    pub fn get_conflict_context(
        &self,
        conflict_id: &str,
        _creds: &AgentCredentials,
    ) -> MemoryResult<Option<ConflictContext>> {
        require_id("conflict_id", conflict_id)?;
        self.ctx
            .read_json(&self.ns.key(conflict_id))
            .or_degraded("get_conflict_context", None)
    }

    /// Mark a conflict resolved. False when no such conflict exists.
    pub fn resolve_conflict(
        &self,
        conflict_id: &str,
        resolution: &str,
        creds: &AgentCredentials,
    ) -> MemoryResult<bool> {
        let _timer = self.ctx.timer("resolve_conflict");
        require_id("conflict_id", conflict_id)?;
        require_id("resolution", resolution)?;
        creds.require(AccessTier::Validator)?;

        let resolved = self
            .resolve_inner(conflict_id, resolution, creds)
            .or_degraded("resolve_conflict", false)?;
        if resolved {
            tracing::info!(agent_id = %creds.agent_id, conflict_id = %conflict_id, "conflict resolved");
        }
        Ok(resolved)
    }

    fn resolve_inner(
        &self,
        conflict_id: &str,
        resolution: &str,
        creds: &AgentCredentials,
    ) -> MemoryResult<bool> {
        let key = self.ns.key(conflict_id);
        let Some(mut context) = self.ctx.read_json::<ConflictContext>(&key)? else {
            return Ok(false);
        };
        context.resolve(resolution, creds.agent_id.clone());
        self.ctx.write_json(
            &key,
            &context,
            self.ttl.resolve(TtlStrategy::ConflictContext),
        )
    }

    /// Unresolved conflicts, ordered by id.
    pub fn list_active_conflicts(
        &self,
        _creds: &AgentCredentials,
    ) -> MemoryResult<Vec<ConflictContext>> {
        let _timer = self.ctx.timer("list_active_conflicts");
        self.list_inner()
            .map(|all| all.into_iter().filter(|c| !c.resolved).collect())
            .or_degraded("list_active_conflicts", Vec::new())
    }

    fn list_inner(&self) -> MemoryResult<Vec<ConflictContext>> {
        let keys = self.ctx.scan_all(&self.ns.pattern())?;
        Ok(self
            .ctx
            .read_all_json(&keys)?
            .into_iter()
            .map(|(_, c)| c)
            .collect())
    }
}
