#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use empathy_core::config::MemoryConfig;
use empathy_core::errors::{StoreError, StoreResult};
use empathy_core::models::{AccessTier, AgentCredentials, StreamEntry, StreamId};
use empathy_core::traits::{IKeyValueStore, IWatchedTransaction, StoreOp};
use empathy_shortterm::ShortTermMemory;
use empathy_store::{InMemoryStore, ManualClock};

pub struct Harness {
    pub memory: ShortTermMemory,
    pub store: Arc<InMemoryStore>,
    pub clock: Arc<ManualClock>,
}

pub fn harness() -> Harness {
    harness_with(MemoryConfig::default())
}

pub fn harness_with(config: MemoryConfig) -> Harness {
    let clock = Arc::new(ManualClock::new());
    let store = Arc::new(InMemoryStore::with_clock(clock.clone()));
    let memory = ShortTermMemory::with_store(store.clone(), &config);
    Harness {
        memory,
        store,
        clock,
    }
}

pub fn observer(id: &str) -> AgentCredentials {
    AgentCredentials::new(id, AccessTier::Observer)
}

pub fn contributor(id: &str) -> AgentCredentials {
    AgentCredentials::new(id, AccessTier::Contributor)
}

pub fn validator(id: &str) -> AgentCredentials {
    AgentCredentials::new(id, AccessTier::Validator)
}

pub fn steward(id: &str) -> AgentCredentials {
    AgentCredentials::new(id, AccessTier::Steward)
}

/// A store whose every call fails as if the server were down.
pub struct DownStore;

fn down<T>() -> StoreResult<T> {
    Err(StoreError::Unavailable("connection refused".into()))
}

impl IKeyValueStore for DownStore {
    fn backend_name(&self) -> &'static str {
        "down"
    }
    fn ping(&self) -> StoreResult<bool> {
        down()
    }
    fn get(&self, _key: &str) -> StoreResult<Option<String>> {
        down()
    }
    fn set(&self, _key: &str, _value: &str, _ttl: Option<Duration>) -> StoreResult<bool> {
        down()
    }
    fn delete(&self, _key: &str) -> StoreResult<bool> {
        down()
    }
    fn exists(&self, _key: &str) -> StoreResult<bool> {
        down()
    }
    fn keys(&self, _pattern: &str) -> StoreResult<Vec<String>> {
        down()
    }
    fn expire(&self, _key: &str, _ttl: Duration) -> StoreResult<bool> {
        down()
    }
    fn mget(&self, _keys: &[String]) -> StoreResult<Vec<Option<String>>> {
        down()
    }
    fn pipeline_execute(&self, _ops: &[StoreOp]) -> StoreResult<Vec<bool>> {
        down()
    }
    fn scan(&self, _cursor: u64, _pattern: &str, _count: usize) -> StoreResult<(u64, Vec<String>)> {
        down()
    }
    fn lpush(&self, _key: &str, _value: &str) -> StoreResult<usize> {
        down()
    }
    fn rpush(&self, _key: &str, _value: &str) -> StoreResult<usize> {
        down()
    }
    fn lpop(&self, _key: &str) -> StoreResult<Option<String>> {
        down()
    }
    fn blpop(&self, _key: &str, _timeout: Duration) -> StoreResult<Option<String>> {
        down()
    }
    fn llen(&self, _key: &str) -> StoreResult<usize> {
        down()
    }
    fn lrange(&self, _key: &str, _start: isize, _stop: isize) -> StoreResult<Vec<String>> {
        down()
    }
    fn zadd(&self, _key: &str, _member: &str, _score: f64) -> StoreResult<bool> {
        down()
    }
    fn zrangebyscore(
        &self,
        _key: &str,
        _min: f64,
        _max: f64,
        _offset: usize,
        _limit: Option<usize>,
    ) -> StoreResult<Vec<(String, f64)>> {
        down()
    }
    fn zcount(&self, _key: &str, _min: f64, _max: f64) -> StoreResult<usize> {
        down()
    }
    fn xadd(
        &self,
        _key: &str,
        _fields: &[(String, String)],
        _max_len: Option<usize>,
    ) -> StoreResult<StreamId> {
        down()
    }
    fn xrange(&self, _key: &str, _after: StreamId, _count: usize) -> StoreResult<Vec<StreamEntry>> {
        down()
    }
    fn xread(
        &self,
        _key: &str,
        _after: Option<StreamId>,
        _block: Option<Duration>,
        _count: usize,
    ) -> StoreResult<Vec<StreamEntry>> {
        down()
    }
    fn watch(&self, _keys: &[&str]) -> StoreResult<Box<dyn IWatchedTransaction + '_>> {
        down()
    }
}
