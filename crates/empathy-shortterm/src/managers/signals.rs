//! Short-lived coordination signals between agents.

use chrono::Utc;

use empathy_core::config::TtlConfig;
use empathy_core::constants::BROADCAST_TARGET;
use empathy_core::errors::MemoryResult;
use empathy_core::models::{AccessTier, AgentCredentials, Signal, TtlStrategy};

use crate::context::{OrDegraded, StoreContext};
use crate::keys::{require_id, Namespace};

/// Signals under `empathy:signal:{target}:{source}:{signal_type}`, where
/// `target` is an agent id or `broadcast`. A newer signal of the same type
/// between the same pair replaces the older one.
pub struct CoordinationSignals {
    ctx: StoreContext,
    ns: Namespace,
    ttl: TtlConfig,
}

impl CoordinationSignals {
    pub fn new(ctx: StoreContext, prefix: impl Into<String>, ttl: TtlConfig) -> Self {
        Self {
            ctx,
            ns: Namespace::new(prefix),
            ttl,
        }
    }

    /// Send to `target_agent`, or to everyone when `None`.
    pub fn send_signal(
        &self,
        signal_type: &str,
        data: serde_json::Value,
        creds: &AgentCredentials,
        target_agent: Option<&str>,
    ) -> MemoryResult<bool> {
        let _timer = self.ctx.timer("send_signal");
        require_id("signal_type", signal_type)?;
        if let Some(target) = target_agent {
            require_id("target_agent", target)?;
        }
        creds.require(AccessTier::Contributor)?;

        let target = target_agent.unwrap_or(BROADCAST_TARGET);
        let key = self
            .ns
            .key(&format!("{target}:{}:{signal_type}", creds.agent_id));
        let signal = Signal {
            signal_type: signal_type.to_string(),
            source_agent: creds.agent_id.clone(),
            target_agent: target_agent.map(str::to_string),
            data,
            sent_at: Utc::now(),
        };
        let sent = self
            .ctx
            .write_json(&key, &signal, self.ttl.resolve(TtlStrategy::Coordination))
            .or_degraded("send_signal", false)?;
        tracing::debug!(source = %creds.agent_id, target = %target, signal_type = %signal_type, sent, "signal sent");
        Ok(sent)
    }

    /// Signals addressed to the caller plus broadcasts from other agents,
    /// oldest first, optionally restricted to one type.
    pub fn receive_signals(
        &self,
        creds: &AgentCredentials,
        signal_type: Option<&str>,
    ) -> MemoryResult<Vec<Signal>> {
        let _timer = self.ctx.timer("receive_signals");
        self.receive_inner(creds, signal_type)
            .or_degraded("receive_signals", Vec::new())
    }

    fn receive_inner(
        &self,
        creds: &AgentCredentials,
        signal_type: Option<&str>,
    ) -> MemoryResult<Vec<Signal>> {
        let mut keys = self
            .ctx
            .scan_all(&self.ns.pattern_under(&format!("{}:", creds.agent_id)))?;
        keys.extend(
            self.ctx
                .scan_all(&self.ns.pattern_under(&format!("{BROADCAST_TARGET}:")))?,
        );

        let mut signals: Vec<Signal> = self
            .ctx
            .read_all_json(&keys)?
            .into_iter()
            .map(|(_, s)| s)
            .filter(|s: &Signal| signal_type.map_or(true, |t| s.signal_type == t))
            .filter(|s| match &s.target_agent {
                Some(target) => *target == creds.agent_id,
                None => s.source_agent != creds.agent_id,
            })
            .collect();
        signals.sort_by(|a, b| a.sent_at.cmp(&b.sent_at));
        Ok(signals)
    }
}
