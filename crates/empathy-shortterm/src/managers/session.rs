//! Multi-agent collaboration sessions.

use empathy_core::config::TtlConfig;
use empathy_core::errors::{MemoryError, MemoryResult};
use empathy_core::models::{AccessTier, AgentCredentials, Session, TtlStrategy};
use empathy_core::traits::StoreOp;

use super::transaction::{compare_and_swap, CasDecision, CasOutcome};
use crate::context::{decode, OrDegraded, StoreContext};
use crate::keys::{require_id, Namespace};

/// Attempts for a membership update before giving up on contention.
const MEMBERSHIP_RETRIES: usize = 10;

/// Sessions under `empathy:session:{session_id}`.
///
/// Join and leave are read-modify-write through compare-and-swap, so two
/// agents joining at once both end up in the participant list.
pub struct SessionManager {
    ctx: StoreContext,
    ns: Namespace,
    ttl: TtlConfig,
}

impl SessionManager {
    pub fn new(ctx: StoreContext, prefix: impl Into<String>, ttl: TtlConfig) -> Self {
        Self {
            ctx,
            ns: Namespace::new(prefix),
            ttl,
        }
    }

    /// Create a session with the caller as its only participant. `metadata`
    /// must be a JSON object when given.
    pub fn create_session(
        &self,
        session_id: &str,
        creds: &AgentCredentials,
        metadata: Option<serde_json::Value>,
    ) -> MemoryResult<bool> {
        let _timer = self.ctx.timer("create_session");
        require_id("session_id", session_id)?;
        let metadata = match metadata {
            None => serde_json::Map::new(),
            Some(serde_json::Value::Object(map)) => map,
            Some(other) => {
                return Err(MemoryError::validation(format!(
                    "session metadata must be an object, got {}",
                    json_kind(&other)
                )))
            }
        };
        creds.require(AccessTier::Contributor)?;

        let session = Session::new(session_id, creds.agent_id.clone(), metadata);
        let written = self
            .ctx
            .write_json(
                &self.ns.key(session_id),
                &session,
                self.ttl.resolve(TtlStrategy::Session),
            )
            .or_degraded("create_session", false)?;
        if written {
            tracing::info!(agent_id = %creds.agent_id, session_id = %session_id, "session created");
        }
        Ok(written)
    }

    /// Add the caller. Joining twice is a no-op. False when the session does
    /// not exist.
    pub fn join_session(&self, session_id: &str, creds: &AgentCredentials) -> MemoryResult<bool> {
        let _timer = self.ctx.timer("join_session");
        require_id("session_id", session_id)?;
        self.update_membership(session_id, |s| {
            s.add_participant(&creds.agent_id);
        })
        .or_degraded("join_session", false)
    }

    /// Remove the caller. Leaving as a non-member is a no-op; false only when
    /// the session does not exist.
    pub fn leave_session(&self, session_id: &str, creds: &AgentCredentials) -> MemoryResult<bool> {
        let _timer = self.ctx.timer("leave_session");
        require_id("session_id", session_id)?;
        self.update_membership(session_id, |s| {
            s.remove_participant(&creds.agent_id);
        })
        .or_degraded("leave_session", false)
    }

    fn update_membership(
        &self,
        session_id: &str,
        change: impl Fn(&mut Session),
    ) -> MemoryResult<bool> {
        let key = self.ns.key(session_id);
        let ttl = self.ttl.resolve(TtlStrategy::Session);
        for attempt in 1..=MEMBERSHIP_RETRIES {
            let outcome = compare_and_swap(self.ctx.store(), &key, |current| {
                let Some(raw) = current else {
                    return Ok(CasDecision::Abort(()));
                };
                let mut session: Session = decode(&key, &raw)?;
                change(&mut session);
                let raw = serde_json::to_string(&session)?;
                Ok(CasDecision::Write(
                    vec![StoreOp::set(key.clone(), raw, Some(ttl))],
                    session.participants.len(),
                ))
            })?;
            match outcome {
                CasOutcome::Committed(participants) => {
                    tracing::debug!(session_id = %session_id, participants, "session membership updated");
                    return Ok(true);
                }
                CasOutcome::Aborted(()) => return Ok(false),
                CasOutcome::Conflict => {
                    tracing::debug!(session_id = %session_id, attempt, "session update contended, retrying");
                }
            }
        }
        tracing::warn!(session_id = %session_id, attempts = MEMBERSHIP_RETRIES, "session update abandoned under contention");
        Ok(false)
    }

    pub fn get_session(
        &self,
        session_id: &str,
        _creds: &AgentCredentials,
    ) -> MemoryResult<Option<Session>> {
        require_id("session_id", session_id)?;
        self.ctx
            .read_json(&self.ns.key(session_id))
            .or_degraded("get_session", None)
    }

    /// Ids of every live session, sorted.
    pub fn list_sessions(&self, _creds: &AgentCredentials) -> MemoryResult<Vec<String>> {
        let keys = self
            .ctx
            .scan_all(&self.ns.pattern())
            .or_degraded("list_sessions", Vec::new())?;
        Ok(keys
            .iter()
            .filter_map(|k| self.ns.id_of(k))
            .map(str::to_string)
            .collect())
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
