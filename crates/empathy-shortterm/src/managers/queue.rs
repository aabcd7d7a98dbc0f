//! FIFO task queues with priority insert.

use std::time::Duration;

use empathy_core::config::TtlConfig;
use empathy_core::errors::MemoryResult;
use empathy_core::models::{AccessTier, AgentCredentials, QueueEntry, TtlStrategy};
use empathy_observability::blocking_read_span;

use crate::context::{decode, OrDegraded, StoreContext};
use crate::keys::{require_id, Namespace};

/// Task queues under `queue:{name}`.
///
/// Normal pushes go to the tail and come out in FIFO order. Priority pushes
/// jump to the head. Every push renews the queue's `TaskQueue` TTL.
pub struct QueueManager {
    ctx: StoreContext,
    ns: Namespace,
    ttl: TtlConfig,
}

impl QueueManager {
    pub fn new(ctx: StoreContext, prefix: impl Into<String>, ttl: TtlConfig) -> Self {
        Self {
            ctx,
            ns: Namespace::new(prefix),
            ttl,
        }
    }

    /// Enqueue `task`. Returns the queue length after the push, or 0 when the
    /// store is unavailable.
    pub fn push(
        &self,
        name: &str,
        task: serde_json::Value,
        creds: &AgentCredentials,
        priority: bool,
    ) -> MemoryResult<usize> {
        let _timer = self.ctx.timer("queue_push");
        require_id("queue name", name)?;
        creds.require(AccessTier::Contributor)?;

        let entry = QueueEntry::new(task, creds.agent_id.clone());
        let raw = serde_json::to_string(&entry)?;
        let key = self.ns.key(name);
        let len = self
            .push_inner(&key, &raw, priority)
            .or_degraded("queue_push", 0)?;
        tracing::debug!(queue = %name, task_id = %entry.task_id, priority, len, "task queued");
        Ok(len)
    }

    fn push_inner(&self, key: &str, raw: &str, priority: bool) -> MemoryResult<usize> {
        let store = self.ctx.store();
        let len = if priority {
            store.lpush(key, raw)?
        } else {
            store.rpush(key, raw)?
        };
        store.expire(key, self.ttl.resolve(TtlStrategy::TaskQueue))?;
        Ok(len)
    }

    /// Take the head of the queue.
    ///
    /// A zero `timeout` never waits. Otherwise waits up to `timeout` for a
    /// task; a timeout is `Ok(None)`, the same as an empty queue.
    pub fn pop(
        &self,
        name: &str,
        _creds: &AgentCredentials,
        timeout: Duration,
    ) -> MemoryResult<Option<QueueEntry>> {
        let _timer = self.ctx.timer("queue_pop");
        require_id("queue name", name)?;
        let key = self.ns.key(name);

        let popped = if timeout.is_zero() {
            self.ctx.store().lpop(&key)
        } else {
            let _span = blocking_read_span!(name, timeout.as_millis() as u64).entered();
            self.ctx.store().blpop(&key, timeout)
        };
        let raw = popped.or_degraded("queue_pop", None)?;
        raw.map(|raw| decode(&key, &raw)).transpose()
    }

    pub fn length(&self, name: &str, _creds: &AgentCredentials) -> MemoryResult<usize> {
        require_id("queue name", name)?;
        self.ctx
            .store()
            .llen(&self.ns.key(name))
            .or_degraded("queue_length", 0)
    }

    /// Up to `count` entries from the head, without removing them.
    pub fn peek(
        &self,
        name: &str,
        _creds: &AgentCredentials,
        count: usize,
    ) -> MemoryResult<Vec<QueueEntry>> {
        require_id("queue name", name)?;
        if count == 0 {
            return Ok(Vec::new());
        }
        let key = self.ns.key(name);
        let stop = isize::try_from(count - 1).unwrap_or(isize::MAX);
        let raws = self
            .ctx
            .store()
            .lrange(&key, 0, stop)
            .or_degraded("queue_peek", Vec::new())?;
        raws.iter().map(|raw| decode(&key, raw)).collect()
    }
}
