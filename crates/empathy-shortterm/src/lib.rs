//! # empathy-shortterm
//!
//! Short-term memory for multi-agent collaboration. Every manager talks to a
//! single [`IKeyValueStore`](empathy_core::traits::IKeyValueStore) and never
//! branches on which backend it is.
//!
//! - Working memory: per-agent scratch data with TTL, single and batched.
//! - Pattern staging: stage → promote/reject, plus a contention-safe promote.
//! - Queues, streams, and timelines for task hand-off and event history.
//! - Sessions, conflict negotiation, and coordination signals.
//!
//! [`ShortTermMemory`] wires them together from a [`MemoryConfig`](empathy_core::MemoryConfig).

mod context;
mod engine;
pub mod keys;
pub mod managers;

pub use context::{OrDegraded, StoreContext};
pub use engine::{MemoryStats, ShortTermMemory};
pub use managers::{
    compare_and_swap, BatchOperations, CasDecision, CasOutcome, ConflictNegotiation,
    CoordinationSignals, Pagination, PatternCache, PatternStaging, PromotionOutcome, QueueManager,
    SessionManager, StashOptions, StreamManager, TimelineManager, TransactionManager,
    WorkingMemory,
};
