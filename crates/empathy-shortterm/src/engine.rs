//! Assembly of every manager over one shared store.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use empathy_core::config::{MemoryConfig, StoreBackend};
use empathy_core::errors::MemoryResult;
#[cfg(not(feature = "redis"))]
use empathy_core::errors::MemoryError;
use empathy_core::models::TtlStrategy;
use empathy_core::traits::{IDataSanitizer, IKeyValueStore, IMetricsSink};
use empathy_observability::OperationMetrics;
use empathy_privacy::PrivacySanitizer;
use empathy_store::InMemoryStore;

use crate::context::{OrDegraded, StoreContext};
use crate::keys::Namespace;
use crate::managers::{
    BatchOperations, ConflictNegotiation, CoordinationSignals, Pagination, PatternCache,
    PatternStaging, QueueManager, SessionManager, StreamManager, TimelineManager,
    TransactionManager, WorkingMemory,
};

/// Health summary of the short-term layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryStats {
    pub backend: String,
    pub ping_ok: bool,
    /// Live key count per record class (`working`, `staged`, ...).
    pub keys: BTreeMap<String, usize>,
}

/// Every manager wired to one store, one sanitizer, and one metrics sink.
pub struct ShortTermMemory {
    ctx: StoreContext,
    metrics: Option<Arc<OperationMetrics>>,
    namespaces: Vec<(&'static str, Namespace)>,
    working: WorkingMemory,
    batch: BatchOperations,
    pagination: Pagination,
    staging: PatternStaging,
    transactions: TransactionManager,
    queues: QueueManager,
    streams: StreamManager,
    timelines: TimelineManager,
    sessions: SessionManager,
    conflicts: ConflictNegotiation,
    signals: CoordinationSignals,
}

impl ShortTermMemory {
    /// Build the configured store and every manager on top of it.
    ///
    /// When the networked store cannot be reached and `fallback_to_memory`
    /// is set, an in-process store is used instead.
    pub fn from_config(config: &MemoryConfig) -> MemoryResult<Self> {
        config.validate()?;
        let store = build_store(config)?;
        Ok(Self::with_store(store, config))
    }

    /// Wire managers over an existing store, with the configured sanitizer
    /// and a fresh [`OperationMetrics`].
    pub fn with_store(store: Arc<dyn IKeyValueStore>, config: &MemoryConfig) -> Self {
        let metrics = Arc::new(OperationMetrics::new(config.observability.metrics_history));
        let sanitizer: Arc<dyn IDataSanitizer> =
            Arc::new(PrivacySanitizer::from_config(&config.privacy));
        let mut memory = Self::with_parts(store, Some(sanitizer), metrics.clone(), config);
        memory.metrics = Some(metrics);
        memory
    }

    /// Wire managers from explicit parts. `sanitizer: None` stores payloads
    /// as given.
    pub fn with_parts(
        store: Arc<dyn IKeyValueStore>,
        sanitizer: Option<Arc<dyn IDataSanitizer>>,
        metrics: Arc<dyn IMetricsSink>,
        config: &MemoryConfig,
    ) -> Self {
        let ctx = StoreContext::new(store, metrics);
        let ks = &config.keyspace;
        let limits = &config.limits;
        let ttl = &config.ttl;
        let cache = PatternCache::new(
            limits.pattern_cache_capacity,
            Duration::from_secs(limits.pattern_cache_ttl_secs)
                .min(ttl.resolve(TtlStrategy::StagedPatterns)),
        );

        let namespaces = vec![
            ("working", Namespace::new(ks.working_prefix.clone())),
            ("staged", Namespace::new(ks.staged_prefix.clone())),
            ("conflict", Namespace::new(ks.conflict_prefix.clone())),
            ("session", Namespace::new(ks.session_prefix.clone())),
            ("signal", Namespace::new(ks.signal_prefix.clone())),
            ("queue", Namespace::new(ks.queue_prefix.clone())),
            ("stream", Namespace::new(ks.stream_prefix.clone())),
            ("timeline", Namespace::new(ks.timeline_prefix.clone())),
        ];

        Self {
            working: WorkingMemory::new(
                ctx.clone(),
                ks.working_prefix.clone(),
                ttl.clone(),
                sanitizer.clone(),
            ),
            batch: BatchOperations::new(
                ctx.clone(),
                ks.working_prefix.clone(),
                ttl.clone(),
                limits.max_batch_size,
                sanitizer,
            ),
            pagination: Pagination::new(
                ctx.clone(),
                ks.staged_prefix.clone(),
                limits.default_page_size,
            ),
            staging: PatternStaging::new(
                ctx.clone(),
                ks.staged_prefix.clone(),
                ttl.clone(),
                cache.clone(),
            ),
            transactions: TransactionManager::new(ctx.clone(), ks.staged_prefix.clone(), cache),
            queues: QueueManager::new(ctx.clone(), ks.queue_prefix.clone(), ttl.clone()),
            streams: StreamManager::new(
                ctx.clone(),
                ks.stream_prefix.clone(),
                ttl.clone(),
                limits.default_stream_max_len,
                limits.default_stream_read_count,
            ),
            timelines: TimelineManager::new(ctx.clone(), ks.timeline_prefix.clone()),
            sessions: SessionManager::new(ctx.clone(), ks.session_prefix.clone(), ttl.clone()),
            conflicts: ConflictNegotiation::new(
                ctx.clone(),
                ks.conflict_prefix.clone(),
                ttl.clone(),
            ),
            signals: CoordinationSignals::new(ctx.clone(), ks.signal_prefix.clone(), ttl.clone()),
            metrics: None,
            namespaces,
            ctx,
        }
    }

    pub fn working(&self) -> &WorkingMemory {
        &self.working
    }

    pub fn batch(&self) -> &BatchOperations {
        &self.batch
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    pub fn staging(&self) -> &PatternStaging {
        &self.staging
    }

    pub fn transactions(&self) -> &TransactionManager {
        &self.transactions
    }

    pub fn queues(&self) -> &QueueManager {
        &self.queues
    }

    pub fn streams(&self) -> &StreamManager {
        &self.streams
    }

    pub fn timelines(&self) -> &TimelineManager {
        &self.timelines
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn conflicts(&self) -> &ConflictNegotiation {
        &self.conflicts
    }

    pub fn signals(&self) -> &CoordinationSignals {
        &self.signals
    }

    pub fn store(&self) -> Arc<dyn IKeyValueStore> {
        self.ctx.store_handle()
    }

    pub fn backend(&self) -> &'static str {
        self.ctx.store().backend_name()
    }

    /// True when the store answers. An unreachable store is `false`, not an error.
    pub fn ping(&self) -> bool {
        match self.ctx.store().ping() {
            Ok(ok) => ok,
            Err(e) => {
                tracing::warn!(backend = self.backend(), error = %e, "store ping failed");
                false
            }
        }
    }

    /// Backend, reachability, and live key count per namespace. Counts are
    /// zero when the store is unavailable.
    pub fn stats(&self) -> MemoryResult<MemoryStats> {
        let _timer = self.ctx.timer("stats");
        let mut keys = BTreeMap::new();
        for (name, ns) in &self.namespaces {
            let count = self
                .ctx
                .scan_all(&ns.pattern())
                .map(|k| k.len())
                .or_degraded("stats", 0)?;
            keys.insert((*name).to_string(), count);
        }
        Ok(MemoryStats {
            backend: self.backend().to_string(),
            ping_ok: self.ping(),
            keys,
        })
    }

    /// Per-operation latency snapshot, when metrics are collected here.
    pub fn metrics_snapshot(&self) -> Option<serde_json::Value> {
        self.metrics.as_ref().map(|m| m.snapshot())
    }
}

fn build_store(config: &MemoryConfig) -> MemoryResult<Arc<dyn IKeyValueStore>> {
    match config.store.backend {
        StoreBackend::Memory => Ok(Arc::new(InMemoryStore::new())),
        StoreBackend::Redis => build_networked(config),
    }
}

#[cfg(feature = "redis")]
fn build_networked(config: &MemoryConfig) -> MemoryResult<Arc<dyn IKeyValueStore>> {
    match empathy_store::RedisStore::from_config(&config.store) {
        Ok(store) => Ok(Arc::new(store)),
        Err(e) if config.store.fallback_to_memory => {
            tracing::warn!(error = %e, "redis unavailable, falling back to in-memory store");
            Ok(Arc::new(InMemoryStore::new()))
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(not(feature = "redis"))]
fn build_networked(config: &MemoryConfig) -> MemoryResult<Arc<dyn IKeyValueStore>> {
    if config.store.fallback_to_memory {
        tracing::warn!("built without redis support, using in-memory store");
        Ok(Arc::new(InMemoryStore::new()))
    } else {
        Err(MemoryError::ConfigError(
            "redis backend requested but this build has no redis support".into(),
        ))
    }
}
