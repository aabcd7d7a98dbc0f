//! Time-windowed queries over sorted event sets.

use empathy_core::errors::{MemoryError, MemoryResult};
use empathy_core::models::{AccessTier, AgentCredentials, TimeWindow, TimelineEvent};

use crate::context::{decode, OrDegraded, StoreContext};
use crate::keys::{require_id, Namespace};

/// Timelines under `timeline:{name}`, scored by event timestamp (unix
/// seconds). Order is by score, never by insertion.
pub struct TimelineManager {
    ctx: StoreContext,
    ns: Namespace,
}

impl TimelineManager {
    pub fn new(ctx: StoreContext, prefix: impl Into<String>) -> Self {
        Self {
            ctx,
            ns: Namespace::new(prefix),
        }
    }

    /// Add an event at `timestamp` (default: now).
    ///
    /// The stored member is the whole event, so `event_id` is not a unique
    /// key: adding the same id again at another time or with other data
    /// records a second occurrence. Returns false only when an identical
    /// event (same id, data, agent and timestamp) was already present.
    pub fn add(
        &self,
        name: &str,
        event_id: &str,
        data: serde_json::Value,
        creds: &AgentCredentials,
        timestamp: Option<f64>,
    ) -> MemoryResult<bool> {
        let _timer = self.ctx.timer("timeline_add");
        require_id("timeline name", name)?;
        require_id("event_id", event_id)?;
        creds.require(AccessTier::Contributor)?;
        let timestamp = timestamp.unwrap_or_else(now_secs);
        if !timestamp.is_finite() {
            return Err(MemoryError::validation(format!(
                "timestamp must be finite, got {timestamp}"
            )));
        }

        let event = TimelineEvent {
            event_id: event_id.to_string(),
            data,
            agent_id: creds.agent_id.clone(),
            timestamp,
        };
        let member = serde_json::to_string(&event)?;
        self.ctx
            .store()
            .zadd(&self.ns.key(name), &member, timestamp)
            .or_degraded("timeline_add", false)
    }

    /// Events with `window.start <= timestamp <= window.end`, ascending, with
    /// the window's offset and limit applied after filtering.
    pub fn query(
        &self,
        name: &str,
        _creds: &AgentCredentials,
        window: &TimeWindow,
    ) -> MemoryResult<Vec<TimelineEvent>> {
        let _timer = self.ctx.timer("timeline_query");
        require_id("timeline name", name)?;
        window.validate()?;
        let key = self.ns.key(name);
        let members = self
            .ctx
            .store()
            .zrangebyscore(&key, window.start, window.end, window.offset, window.limit)
            .or_degraded("timeline_query", Vec::new())?;
        members
            .iter()
            .map(|(member, _)| decode(&key, member))
            .collect()
    }

    /// Size of the same range [`query`](Self::query) would return, ignoring
    /// offset and limit.
    pub fn count(
        &self,
        name: &str,
        _creds: &AgentCredentials,
        window: &TimeWindow,
    ) -> MemoryResult<usize> {
        require_id("timeline name", name)?;
        window.validate()?;
        self.ctx
            .store()
            .zcount(&self.ns.key(name), window.start, window.end)
            .or_degraded("timeline_count", 0)
    }
}

fn now_secs() -> f64 {
    chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0
}
