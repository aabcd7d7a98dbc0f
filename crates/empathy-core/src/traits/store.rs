use std::time::Duration;

use crate::errors::StoreResult;
use crate::models::{StreamEntry, StreamId};

/// A single write inside a pipeline or transaction.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreOp {
    Set {
        key: String,
        value: String,
        ttl: Option<Duration>,
    },
    Delete {
        key: String,
    },
}

impl StoreOp {
    pub fn set(key: impl Into<String>, value: impl Into<String>, ttl: Option<Duration>) -> Self {
        Self::Set {
            key: key.into(),
            value: value.into(),
            ttl,
        }
    }

    pub fn delete(key: impl Into<String>) -> Self {
        Self::Delete { key: key.into() }
    }

    pub fn key(&self) -> &str {
        match self {
            Self::Set { key, .. } | Self::Delete { key } => key,
        }
    }
}

/// Result of executing a watched transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxOutcome {
    /// All ops applied. One flag per op: `Set` always true, `Delete` true if
    /// the key existed.
    Committed(Vec<bool>),
    /// A watched key changed after `watch`; nothing was applied.
    Conflict,
}

/// An open optimistic transaction returned by [`IKeyValueStore::watch`].
///
/// Implementations release the watch on drop, so `unwatch` runs on every exit
/// path even when the caller bails out early.
pub trait IWatchedTransaction {
    /// Read a key through the transaction's connection.
    fn get(&mut self, key: &str) -> StoreResult<Option<String>>;

    /// Apply `ops` atomically iff no watched key changed since `watch`.
    fn exec(&mut self, ops: &[StoreOp]) -> StoreResult<TxOutcome>;

    /// Release the watch without executing. Idempotent.
    fn unwatch(&mut self) -> StoreResult<()>;
}

/// The backing key-value service.
///
/// Two implementations exist: an in-process map for tests and offline use and
/// a networked client. Both must be observably identical. Patterns use glob
/// syntax (`*`, `?`, `[abc]`, `\` escapes). TTLs are applied per key on write.
pub trait IKeyValueStore: Send + Sync {
    /// Short backend label, e.g. `"memory"` or `"redis"`.
    fn backend_name(&self) -> &'static str;

    fn ping(&self) -> StoreResult<bool>;

    // --- Strings ---
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> StoreResult<bool>;
    fn delete(&self, key: &str) -> StoreResult<bool>;
    fn exists(&self, key: &str) -> StoreResult<bool>;
    fn keys(&self, pattern: &str) -> StoreResult<Vec<String>>;
    /// Set a TTL on an existing key of any kind. False when the key is absent.
    fn expire(&self, key: &str, ttl: Duration) -> StoreResult<bool>;
    fn mget(&self, keys: &[String]) -> StoreResult<Vec<Option<String>>>;

    /// Execute all ops as one atomic batch: either every op commits or none do.
    fn pipeline_execute(&self, ops: &[StoreOp]) -> StoreResult<Vec<bool>>;

    /// One step of a cursor scan. A returned cursor of `0` ends the scan.
    fn scan(&self, cursor: u64, pattern: &str, count: usize) -> StoreResult<(u64, Vec<String>)>;

    // --- Lists ---
    /// Insert at the head. Returns the new length.
    fn lpush(&self, key: &str, value: &str) -> StoreResult<usize>;
    /// Append at the tail. Returns the new length.
    fn rpush(&self, key: &str, value: &str) -> StoreResult<usize>;
    fn lpop(&self, key: &str) -> StoreResult<Option<String>>;
    /// Pop from the head, waiting up to `timeout`. `None` on timeout.
    /// Blocks only the calling thread.
    fn blpop(&self, key: &str, timeout: Duration) -> StoreResult<Option<String>>;
    fn llen(&self, key: &str) -> StoreResult<usize>;
    /// Inclusive range; negative indexes count from the tail.
    fn lrange(&self, key: &str, start: isize, stop: isize) -> StoreResult<Vec<String>>;

    // --- Sorted sets ---
    /// Add or re-score a member. Returns true when the member is new.
    fn zadd(&self, key: &str, member: &str, score: f64) -> StoreResult<bool>;
    /// Members with `min <= score <= max`, ascending by score then member,
    /// with `offset`/`limit` applied after filtering.
    fn zrangebyscore(
        &self,
        key: &str,
        min: f64,
        max: f64,
        offset: usize,
        limit: Option<usize>,
    ) -> StoreResult<Vec<(String, f64)>>;
    fn zcount(&self, key: &str, min: f64, max: f64) -> StoreResult<usize>;

    // --- Streams ---
    /// Append an entry, trimming the stream to at most `max_len` entries.
    fn xadd(
        &self,
        key: &str,
        fields: &[(String, String)],
        max_len: Option<usize>,
    ) -> StoreResult<StreamId>;
    /// Entries with id strictly greater than `after`, ascending, capped at `count`.
    fn xrange(&self, key: &str, after: StreamId, count: usize) -> StoreResult<Vec<StreamEntry>>;
    /// Entries added after `after` (or after the current tail when `None`),
    /// waiting up to `block` for at least one. Empty on timeout.
    fn xread(
        &self,
        key: &str,
        after: Option<StreamId>,
        block: Option<Duration>,
        count: usize,
    ) -> StoreResult<Vec<StreamEntry>>;

    // --- Optimistic transactions ---
    fn watch(&self, keys: &[&str]) -> StoreResult<Box<dyn IWatchedTransaction + '_>>;
}
