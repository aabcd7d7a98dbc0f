//! Process-local store for tests and offline mode.
//!
//! All value kinds share one mutex-guarded keyspace, so pipelines and
//! transactions are atomic by construction. Blocking reads wait on a condvar
//! and release the lock while waiting; only the calling thread blocks.
//! Not shared across processes.

mod keyspace;
mod transaction;

use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use empathy_core::errors::{StoreError, StoreResult};
use empathy_core::models::{StreamEntry, StreamId};
use empathy_core::traits::{IKeyValueStore, IWatchedTransaction, StoreOp};

use crate::clock::{Clock, SystemClock};
use keyspace::KeySpace;
use transaction::MemoryTransaction;

pub struct InMemoryStore {
    state: Mutex<KeySpace>,
    changed: Condvar,
    clock: Arc<dyn Clock>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Use an injected clock for TTL and stream ids (see [`crate::ManualClock`]).
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(KeySpace::default()),
            changed: Condvar::new(),
            clock,
        }
    }

    /// Physically drop expired entries. Reads never need this.
    pub fn purge_expired(&self) -> StoreResult<usize> {
        let now = self.clock.now();
        Ok(self.lock()?.purge_expired(now))
    }

    /// Number of live keys.
    pub fn len(&self) -> StoreResult<usize> {
        let now = self.clock.now();
        Ok(self.lock()?.len(now))
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, KeySpace>> {
        self.state
            .lock()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }

    /// Wait for a write, up to `deadline`. Returns `None` once the deadline passed.
    fn wait_until<'a>(
        &self,
        guard: MutexGuard<'a, KeySpace>,
        deadline: Instant,
    ) -> StoreResult<Option<MutexGuard<'a, KeySpace>>> {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Ok(None);
        }
        let (guard, _) = self
            .changed
            .wait_timeout(guard, remaining)
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
        Ok(Some(guard))
    }

    fn push(&self, key: &str, value: &str, front: bool) -> StoreResult<usize> {
        let now = self.clock.now();
        let len = {
            let mut state = self.lock()?;
            let list = state.list_mut(key, now)?;
            if front {
                list.push_front(value.to_string());
            } else {
                list.push_back(value.to_string());
            }
            let len = list.len();
            state.touch(key);
            len
        };
        self.changed.notify_all();
        Ok(len)
    }

    fn entries_after(
        state: &KeySpace,
        key: &str,
        after: StreamId,
        count: usize,
        now: Instant,
    ) -> StoreResult<Vec<StreamEntry>> {
        Ok(match state.stream(key, now)? {
            Some(log) => log
                .entries
                .iter()
                .filter(|e| e.id > after)
                .take(count)
                .cloned()
                .collect(),
            None => Vec::new(),
        })
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl IKeyValueStore for InMemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    fn ping(&self) -> StoreResult<bool> {
        self.lock().map(|_| true)
    }

    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let now = self.clock.now();
        let state = self.lock()?;
        Ok(state.get_str(key, now)?.map(str::to_string))
    }

    fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> StoreResult<bool> {
        let now = self.clock.now();
        let mut state = self.lock()?;
        state.apply(&[StoreOp::set(key, value, ttl)], now);
        Ok(true)
    }

    fn delete(&self, key: &str) -> StoreResult<bool> {
        let now = self.clock.now();
        Ok(self.lock()?.remove(key, now))
    }

    fn exists(&self, key: &str) -> StoreResult<bool> {
        let now = self.clock.now();
        Ok(self.lock()?.live(key, now).is_some())
    }

    fn keys(&self, pattern: &str) -> StoreResult<Vec<String>> {
        let now = self.clock.now();
        Ok(self.lock()?.matching_keys(pattern, now))
    }

    fn expire(&self, key: &str, ttl: Duration) -> StoreResult<bool> {
        let now = self.clock.now();
        Ok(self.lock()?.expire(key, now + ttl, now))
    }

    fn mget(&self, keys: &[String]) -> StoreResult<Vec<Option<String>>> {
        let now = self.clock.now();
        let state = self.lock()?;
        // Non-string keys read as missing, matching MGET.
        Ok(keys
            .iter()
            .map(|k| state.get_str(k, now).ok().flatten().map(str::to_string))
            .collect())
    }

    fn pipeline_execute(&self, ops: &[StoreOp]) -> StoreResult<Vec<bool>> {
        let now = self.clock.now();
        let mut state = self.lock()?;
        Ok(state.apply(ops, now))
    }

    fn scan(&self, cursor: u64, pattern: &str, count: usize) -> StoreResult<(u64, Vec<String>)> {
        let now = self.clock.now();
        let keys = self.lock()?.matching_keys(pattern, now);
        let start = usize::try_from(cursor).unwrap_or(usize::MAX);
        if start >= keys.len() {
            return Ok((0, Vec::new()));
        }
        let end = start.saturating_add(count.max(1)).min(keys.len());
        let next = if end >= keys.len() { 0 } else { end as u64 };
        Ok((next, keys[start..end].to_vec()))
    }

    fn lpush(&self, key: &str, value: &str) -> StoreResult<usize> {
        self.push(key, value, true)
    }

    fn rpush(&self, key: &str, value: &str) -> StoreResult<usize> {
        self.push(key, value, false)
    }

    fn lpop(&self, key: &str) -> StoreResult<Option<String>> {
        let now = self.clock.now();
        self.lock()?.pop_front(key, now)
    }

    fn blpop(&self, key: &str, timeout: Duration) -> StoreResult<Option<String>> {
        let deadline = Instant::now() + timeout;
        let mut state = self.lock()?;
        loop {
            let now = self.clock.now();
            if let Some(value) = state.pop_front(key, now)? {
                return Ok(Some(value));
            }
            match self.wait_until(state, deadline)? {
                Some(guard) => state = guard,
                None => return Ok(None),
            }
        }
    }

    fn llen(&self, key: &str) -> StoreResult<usize> {
        let now = self.clock.now();
        Ok(self.lock()?.list(key, now)?.map_or(0, |l| l.len()))
    }

    fn lrange(&self, key: &str, start: isize, stop: isize) -> StoreResult<Vec<String>> {
        let now = self.clock.now();
        let state = self.lock()?;
        let Some(list) = state.list(key, now)? else {
            return Ok(Vec::new());
        };
        let len = list.len() as isize;
        let start = if start < 0 { (len + start).max(0) } else { start };
        let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };
        if start > stop || start >= len {
            return Ok(Vec::new());
        }
        Ok(list
            .iter()
            .skip(start as usize)
            .take((stop - start + 1) as usize)
            .cloned()
            .collect())
    }

    fn zadd(&self, key: &str, member: &str, score: f64) -> StoreResult<bool> {
        let now = self.clock.now();
        let mut state = self.lock()?;
        let added = state
            .zset_mut(key, now)?
            .insert(member.to_string(), score)
            .is_none();
        state.touch(key);
        Ok(added)
    }

    fn zrangebyscore(
        &self,
        key: &str,
        min: f64,
        max: f64,
        offset: usize,
        limit: Option<usize>,
    ) -> StoreResult<Vec<(String, f64)>> {
        let now = self.clock.now();
        let state = self.lock()?;
        let Some(set) = state.zset(key, now)? else {
            return Ok(Vec::new());
        };
        let mut members: Vec<(String, f64)> = set
            .iter()
            .filter(|(_, s)| **s >= min && **s <= max)
            .map(|(m, s)| (m.clone(), *s))
            .collect();
        members.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        Ok(members
            .into_iter()
            .skip(offset)
            .take(limit.unwrap_or(usize::MAX))
            .collect())
    }

    fn zcount(&self, key: &str, min: f64, max: f64) -> StoreResult<usize> {
        let now = self.clock.now();
        let state = self.lock()?;
        Ok(state
            .zset(key, now)?
            .map_or(0, |set| set.values().filter(|s| **s >= min && **s <= max).count()))
    }

    fn xadd(
        &self,
        key: &str,
        fields: &[(String, String)],
        max_len: Option<usize>,
    ) -> StoreResult<StreamId> {
        let now = self.clock.now();
        let now_ms = self.clock.unix_millis();
        let id = {
            let mut state = self.lock()?;
            let log = state.stream_mut(key, now)?;
            let id = log.last_id.next_after(now_ms);
            log.last_id = id;
            log.entries.push_back(StreamEntry {
                id,
                fields: fields.to_vec(),
            });
            if let Some(max_len) = max_len {
                while log.entries.len() > max_len {
                    log.entries.pop_front();
                }
            }
            state.touch(key);
            id
        };
        self.changed.notify_all();
        Ok(id)
    }

    fn xrange(&self, key: &str, after: StreamId, count: usize) -> StoreResult<Vec<StreamEntry>> {
        let now = self.clock.now();
        let state = self.lock()?;
        Self::entries_after(&state, key, after, count, now)
    }

    fn xread(
        &self,
        key: &str,
        after: Option<StreamId>,
        block: Option<Duration>,
        count: usize,
    ) -> StoreResult<Vec<StreamEntry>> {
        let deadline = Instant::now() + block.unwrap_or_default();
        let mut state = self.lock()?;
        let after = match after {
            Some(id) => id,
            None => state
                .stream(key, self.clock.now())?
                .map_or(StreamId::ZERO, |log| log.last_id),
        };
        loop {
            let entries = Self::entries_after(&state, key, after, count, self.clock.now())?;
            if !entries.is_empty() || block.is_none() {
                return Ok(entries);
            }
            match self.wait_until(state, deadline)? {
                Some(guard) => state = guard,
                None => return Ok(Vec::new()),
            }
        }
    }

    fn watch(&self, keys: &[&str]) -> StoreResult<Box<dyn IWatchedTransaction + '_>> {
        let state = self.lock()?;
        let watched = keys
            .iter()
            .map(|k| (k.to_string(), state.version(k)))
            .collect();
        Ok(Box::new(MemoryTransaction::new(self, watched)))
    }
}

impl InMemoryStore {
    /// Apply `ops` only if no watched key was written since its version was taken.
    fn apply_if_unchanged(
        &self,
        watched: &[(String, u64)],
        ops: &[StoreOp],
    ) -> StoreResult<Option<Vec<bool>>> {
        let now = self.clock.now();
        let mut state = self.lock()?;
        if watched.iter().any(|(k, v)| state.version(k) != *v) {
            return Ok(None);
        }
        Ok(Some(state.apply(ops, now)))
    }
}
