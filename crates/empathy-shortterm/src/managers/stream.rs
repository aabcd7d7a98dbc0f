//! Bounded, ordered, append-only event logs.

use std::time::Duration;

use chrono::Utc;

use empathy_core::config::TtlConfig;
use empathy_core::errors::{MemoryError, MemoryResult};
use empathy_core::models::{
    AccessTier, AgentCredentials, StreamEntry, StreamEvent, StreamId, TtlStrategy,
};
use empathy_observability::blocking_read_span;

use crate::context::{OrDegraded, StoreContext};
use crate::keys::{require_id, Namespace};

/// Streams under `stream:{name}`.
///
/// Ids increase strictly with append order. Appends trim exactly: the stream
/// never holds more than `max_len` entries, oldest dropped first.
pub struct StreamManager {
    ctx: StoreContext,
    ns: Namespace,
    ttl: TtlConfig,
    default_max_len: usize,
    default_count: usize,
}

impl StreamManager {
    pub fn new(
        ctx: StoreContext,
        prefix: impl Into<String>,
        ttl: TtlConfig,
        default_max_len: usize,
        default_count: usize,
    ) -> Self {
        Self {
            ctx,
            ns: Namespace::new(prefix),
            ttl,
            default_max_len,
            default_count,
        }
    }

    pub fn default_max_len(&self) -> usize {
        self.default_max_len
    }

    pub fn default_count(&self) -> usize {
        self.default_count
    }

    /// Append `data`. Returns the new entry id, or `None` when the store is
    /// unavailable. `max_len` defaults to the configured stream length.
    pub fn append(
        &self,
        name: &str,
        data: serde_json::Value,
        creds: &AgentCredentials,
        max_len: Option<usize>,
    ) -> MemoryResult<Option<StreamId>> {
        let _timer = self.ctx.timer("stream_append");
        require_id("stream name", name)?;
        creds.require(AccessTier::Contributor)?;
        let max_len = max_len.unwrap_or(self.default_max_len);
        if max_len == 0 {
            return Err(MemoryError::validation("max_len must be greater than 0"));
        }

        let event = StreamEvent {
            entry_id: StreamId::ZERO,
            data,
            agent_id: creds.agent_id.clone(),
            timestamp: Utc::now(),
        };
        let fields = event.to_fields()?;
        let key = self.ns.key(name);
        let id = self
            .append_inner(&key, &fields, max_len)
            .map(Some)
            .or_degraded("stream_append", None)?;
        tracing::debug!(stream = %name, agent_id = %creds.agent_id, id = ?id, "stream append");
        Ok(id)
    }

    fn append_inner(
        &self,
        key: &str,
        fields: &[(String, String)],
        max_len: usize,
    ) -> MemoryResult<StreamId> {
        let id = self.ctx.store().xadd(key, fields, Some(max_len))?;
        self.ctx
            .store()
            .expire(key, self.ttl.resolve(TtlStrategy::StreamEntry))?;
        Ok(id)
    }

    /// Entries with id greater than `start_id` (`"0"` for the beginning),
    /// ascending, at most `count`.
    pub fn read(
        &self,
        name: &str,
        _creds: &AgentCredentials,
        start_id: &str,
        count: usize,
    ) -> MemoryResult<Vec<StreamEvent>> {
        let _timer = self.ctx.timer("stream_read");
        require_id("stream name", name)?;
        let after: StreamId = start_id
            .parse()
            .map_err(|_| MemoryError::validation(format!("invalid stream id: {start_id:?}")))?;
        if count == 0 {
            return Ok(Vec::new());
        }
        let key = self.ns.key(name);
        let entries = self
            .ctx
            .store()
            .xrange(&key, after, count)
            .or_degraded("stream_read", Vec::new())?;
        decode_entries(&key, &entries)
    }

    /// Entries appended after this call starts, waiting up to `block` for at
    /// least one.
    ///
    /// A zero `block` does not wait: it returns immediately, and since only
    /// entries newer than the call are eligible, that is always empty.
    pub fn read_new(
        &self,
        name: &str,
        _creds: &AgentCredentials,
        block: Duration,
        count: usize,
    ) -> MemoryResult<Vec<StreamEvent>> {
        let _timer = self.ctx.timer("stream_read_new");
        require_id("stream name", name)?;
        if count == 0 {
            return Ok(Vec::new());
        }
        let key = self.ns.key(name);
        let block = (!block.is_zero()).then_some(block);
        let read = {
            let _span =
                blocking_read_span!(name, block.map_or(0, |b| b.as_millis() as u64)).entered();
            self.ctx.store().xread(&key, None, block, count)
        };
        let entries = read.or_degraded("stream_read_new", Vec::new())?;
        decode_entries(&key, &entries)
    }
}

fn decode_entries(key: &str, entries: &[StreamEntry]) -> MemoryResult<Vec<StreamEvent>> {
    entries
        .iter()
        .map(|entry| {
            StreamEvent::from_entry(entry).map_err(|reason| MemoryError::Corrupted {
                key: key.to_string(),
                reason,
            })
        })
        .collect()
}
