//! One manager per record class. Each holds its own namespace and TTL.

mod batch;
mod conflict;
mod pagination;
mod queue;
mod session;
mod signals;
mod staging;
mod stream;
mod timeline;
mod transaction;
mod working;

pub use batch::BatchOperations;
pub use conflict::ConflictNegotiation;
pub use pagination::Pagination;
pub use queue::QueueManager;
pub use session::SessionManager;
pub use signals::CoordinationSignals;
pub use staging::{PatternCache, PatternStaging};
pub use stream::StreamManager;
pub use timeline::TimelineManager;
pub use transaction::{compare_and_swap, CasDecision, CasOutcome, PromotionOutcome, TransactionManager};
pub use working::{StashOptions, WorkingMemory};
