//! Handles shared by every manager, plus the degraded-backend policy.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use empathy_core::constants::FULL_SCAN_BATCH;
use empathy_core::errors::{MemoryError, MemoryResult, StoreError, StoreResult};
use empathy_core::traits::{IDataSanitizer, IKeyValueStore, IMetricsSink};
use empathy_observability::OperationTimer;

/// Store and metrics handles. Cloning is cheap.
#[derive(Clone)]
pub struct StoreContext {
    store: Arc<dyn IKeyValueStore>,
    metrics: Arc<dyn IMetricsSink>,
}

impl StoreContext {
    pub fn new(store: Arc<dyn IKeyValueStore>, metrics: Arc<dyn IMetricsSink>) -> Self {
        Self { store, metrics }
    }

    pub fn store(&self) -> &dyn IKeyValueStore {
        self.store.as_ref()
    }

    pub fn store_handle(&self) -> Arc<dyn IKeyValueStore> {
        self.store.clone()
    }

    /// Start timing `op`; the sample is recorded when the timer drops.
    pub(crate) fn timer(&self, op: &'static str) -> OperationTimer {
        OperationTimer::start(self.metrics.clone(), op)
    }

    /// Every key matching `pattern`, sorted and de-duplicated. SCAN may
    /// repeat keys across pages.
    pub(crate) fn scan_all(&self, pattern: &str) -> MemoryResult<Vec<String>> {
        let mut keys = Vec::new();
        let mut cursor = 0u64;
        loop {
            let (next, page) = self.store.scan(cursor, pattern, FULL_SCAN_BATCH)?;
            keys.extend(page);
            if next == 0 {
                break;
            }
            cursor = next;
        }
        keys.sort();
        keys.dedup();
        Ok(keys)
    }

    /// Read and decode a JSON record. A payload that does not decode is
    /// [`MemoryError::Corrupted`], never a miss.
    pub(crate) fn read_json<T: DeserializeOwned>(&self, key: &str) -> MemoryResult<Option<T>> {
        match self.store.get(key)? {
            Some(raw) => decode(key, &raw).map(Some),
            None => Ok(None),
        }
    }

    pub(crate) fn write_json<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> MemoryResult<bool> {
        let raw = serde_json::to_string(value)?;
        Ok(self.store.set(key, &raw, Some(ttl))?)
    }

    /// Read every key in `keys` with one `mget` and decode the hits.
    /// Keys that vanished between listing and reading are skipped.
    pub(crate) fn read_all_json<T: DeserializeOwned>(
        &self,
        keys: &[String],
    ) -> MemoryResult<Vec<(String, T)>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let values = self.store.mget(keys)?;
        let mut out = Vec::with_capacity(values.len());
        for (key, raw) in keys.iter().zip(values) {
            if let Some(raw) = raw {
                let record = decode(key, &raw)?;
                out.push((key.clone(), record));
            }
        }
        Ok(out)
    }
}

pub(crate) fn decode<T: DeserializeOwned>(key: &str, raw: &str) -> MemoryResult<T> {
    serde_json::from_str(raw).map_err(|e| MemoryError::Corrupted {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

/// Run `data` through the sanitizer. Secrets become
/// [`MemoryError::SecurityViolation`]; redacted PII is logged by count only.
pub(crate) fn sanitize(
    sanitizer: Option<&dyn IDataSanitizer>,
    data: &serde_json::Value,
    agent_id: &str,
    key: &str,
) -> MemoryResult<serde_json::Value> {
    let Some(sanitizer) = sanitizer else {
        return Ok(data.clone());
    };
    match sanitizer.sanitize(data) {
        Ok(cleaned) => {
            if cleaned.pii_count > 0 {
                tracing::warn!(agent_id = %agent_id, key = %key, pii_count = cleaned.pii_count, "redacted PII before storage");
            }
            Ok(cleaned.data)
        }
        Err(e) => {
            tracing::error!(agent_id = %agent_id, key = %key, error = %e, "secrets detected, storage refused");
            Err(e.into())
        }
    }
}

/// Degraded-backend policy: an unreachable store becomes `fallback` plus a
/// warning. Every other error passes through, including records of the wrong
/// kind and a poisoned store lock.
pub trait OrDegraded<T> {
    fn or_degraded(self, op: &'static str, fallback: T) -> MemoryResult<T>;
}

impl<T> OrDegraded<T> for MemoryResult<T> {
    fn or_degraded(self, op: &'static str, fallback: T) -> MemoryResult<T> {
        match self {
            Err(MemoryError::StoreError(e)) if e.is_unavailable() => {
                Ok(degraded(op, &e, fallback))
            }
            other => other,
        }
    }
}

impl<T> OrDegraded<T> for StoreResult<T> {
    fn or_degraded(self, op: &'static str, fallback: T) -> MemoryResult<T> {
        match self {
            Ok(value) => Ok(value),
            Err(e) if e.is_unavailable() => Ok(degraded(op, &e, fallback)),
            Err(e) => Err(e.into()),
        }
    }
}

fn degraded<T>(op: &'static str, err: &StoreError, fallback: T) -> T {
    tracing::warn!(op, error = %err, "store unavailable, returning degraded result");
    fallback
}
