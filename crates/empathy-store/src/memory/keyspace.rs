//! The single keyspace shared by every value kind in [`super::InMemoryStore`].

use std::collections::{HashMap, VecDeque};
use std::time::Instant;

use empathy_core::errors::{StoreError, StoreResult};
use empathy_core::models::{StreamEntry, StreamId};
use empathy_core::traits::StoreOp;

use crate::glob::GlobMatcher;

#[derive(Debug, Clone)]
pub(crate) enum Value {
    Str(String),
    List(VecDeque<String>),
    ZSet(HashMap<String, f64>),
    Stream(StreamLog),
}

#[derive(Debug, Clone, Default)]
pub(crate) struct StreamLog {
    pub entries: VecDeque<StreamEntry>,
    pub last_id: StreamId,
}

#[derive(Debug, Clone)]
pub(crate) struct Entry {
    pub value: Value,
    pub expires_at: Option<Instant>,
}

impl Entry {
    pub fn persistent(value: Value) -> Self {
        Self {
            value,
            expires_at: None,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// Keys, values, and per-key write versions.
///
/// Expired entries stay in `entries` until overwritten, touched by a write, or
/// removed by `purge_expired`; every read path filters them out.
#[derive(Debug, Default)]
pub(crate) struct KeySpace {
    entries: HashMap<String, Entry>,
    versions: HashMap<String, u64>,
    next_version: u64,
}

impl KeySpace {
    pub fn live(&self, key: &str, now: Instant) -> Option<&Entry> {
        self.entries.get(key).filter(|e| !e.is_expired(now))
    }

    /// Mutable access to a live entry. An expired entry found here is dropped.
    pub fn live_mut(&mut self, key: &str, now: Instant) -> Option<&mut Entry> {
        if self.entries.get(key).is_some_and(|e| e.is_expired(now)) {
            self.entries.remove(key);
        }
        self.entries.get_mut(key)
    }

    pub fn insert(&mut self, key: &str, entry: Entry) {
        self.entries.insert(key.to_string(), entry);
        self.touch(key);
    }

    /// Remove a live key. Returns whether anything visible was removed.
    pub fn remove(&mut self, key: &str, now: Instant) -> bool {
        match self.entries.remove(key) {
            Some(entry) => {
                self.touch(key);
                !entry.is_expired(now)
            }
            None => false,
        }
    }

    /// Set the expiry of a live key. Returns false when the key is absent.
    pub fn expire(&mut self, key: &str, at: Instant, now: Instant) -> bool {
        let Some(entry) = self.live_mut(key, now) else {
            return false;
        };
        entry.expires_at = Some(at);
        self.touch(key);
        true
    }

    /// Record a write to `key` for watchers.
    pub fn touch(&mut self, key: &str) {
        self.next_version += 1;
        self.versions.insert(key.to_string(), self.next_version);
    }

    pub fn version(&self, key: &str) -> u64 {
        self.versions.get(key).copied().unwrap_or(0)
    }

    pub fn get_str(&self, key: &str, now: Instant) -> StoreResult<Option<&str>> {
        match self.live(key, now) {
            None => Ok(None),
            Some(Entry {
                value: Value::Str(s),
                ..
            }) => Ok(Some(s.as_str())),
            Some(_) => Err(wrong_type(key)),
        }
    }

    /// Live keys matching `pattern`, sorted so index-based cursors are stable.
    pub fn matching_keys(&self, pattern: &str, now: Instant) -> Vec<String> {
        let matcher = GlobMatcher::new(pattern);
        let mut keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(k, e)| !e.is_expired(now) && matcher.is_match(k))
            .map(|(k, _)| k.clone())
            .collect();
        keys.sort();
        keys
    }

    /// Apply writes in order. Cannot fail part-way.
    pub fn apply(&mut self, ops: &[StoreOp], now: Instant) -> Vec<bool> {
        ops.iter()
            .map(|op| match op {
                StoreOp::Set { key, value, ttl } => {
                    let expires_at = ttl.map(|ttl| now + ttl);
                    self.insert(
                        key,
                        Entry {
                            value: Value::Str(value.clone()),
                            expires_at,
                        },
                    );
                    true
                }
                StoreOp::Delete { key } => self.remove(key, now),
            })
            .collect()
    }

    /// The list at `key`, created empty if absent.
    pub fn list_mut(&mut self, key: &str, now: Instant) -> StoreResult<&mut VecDeque<String>> {
        if self.live_mut(key, now).is_none() {
            self.entries
                .insert(key.to_string(), Entry::persistent(Value::List(VecDeque::new())));
        }
        match self.entries.get_mut(key).map(|e| &mut e.value) {
            Some(Value::List(list)) => Ok(list),
            _ => Err(wrong_type(key)),
        }
    }

    pub fn list(&self, key: &str, now: Instant) -> StoreResult<Option<&VecDeque<String>>> {
        match self.live(key, now).map(|e| &e.value) {
            None => Ok(None),
            Some(Value::List(list)) => Ok(Some(list)),
            Some(_) => Err(wrong_type(key)),
        }
    }

    /// Pop the head of a list, deleting the key once it is empty.
    pub fn pop_front(&mut self, key: &str, now: Instant) -> StoreResult<Option<String>> {
        let popped = match self.live_mut(key, now).map(|e| &mut e.value) {
            None => return Ok(None),
            Some(Value::List(list)) => list.pop_front(),
            Some(_) => return Err(wrong_type(key)),
        };
        if popped.is_some() {
            let empty = matches!(
                self.entries.get(key).map(|e| &e.value),
                Some(Value::List(list)) if list.is_empty()
            );
            if empty {
                self.entries.remove(key);
            }
            self.touch(key);
        }
        Ok(popped)
    }

    pub fn zset_mut(&mut self, key: &str, now: Instant) -> StoreResult<&mut HashMap<String, f64>> {
        if self.live_mut(key, now).is_none() {
            self.entries
                .insert(key.to_string(), Entry::persistent(Value::ZSet(HashMap::new())));
        }
        match self.entries.get_mut(key).map(|e| &mut e.value) {
            Some(Value::ZSet(set)) => Ok(set),
            _ => Err(wrong_type(key)),
        }
    }

    pub fn zset(&self, key: &str, now: Instant) -> StoreResult<Option<&HashMap<String, f64>>> {
        match self.live(key, now).map(|e| &e.value) {
            None => Ok(None),
            Some(Value::ZSet(set)) => Ok(Some(set)),
            Some(_) => Err(wrong_type(key)),
        }
    }

    pub fn stream_mut(&mut self, key: &str, now: Instant) -> StoreResult<&mut StreamLog> {
        if self.live_mut(key, now).is_none() {
            self.entries
                .insert(key.to_string(), Entry::persistent(Value::Stream(StreamLog::default())));
        }
        match self.entries.get_mut(key).map(|e| &mut e.value) {
            Some(Value::Stream(log)) => Ok(log),
            _ => Err(wrong_type(key)),
        }
    }

    pub fn stream(&self, key: &str, now: Instant) -> StoreResult<Option<&StreamLog>> {
        match self.live(key, now).map(|e| &e.value) {
            None => Ok(None),
            Some(Value::Stream(log)) => Ok(Some(log)),
            Some(_) => Err(wrong_type(key)),
        }
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, e| !e.is_expired(now));
        before - self.entries.len()
    }

    pub fn len(&self, now: Instant) -> usize {
        self.entries.values().filter(|e| !e.is_expired(now)).count()
    }
}

pub(crate) fn wrong_type(key: &str) -> StoreError {
    StoreError::WrongType {
        key: key.to_string(),
    }
}
