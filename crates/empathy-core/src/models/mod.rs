//! Records and value types shared by every manager.

pub mod conflict;
pub mod credentials;
pub mod pagination;
pub mod pattern;
pub mod record;
pub mod session;
pub mod signal;
pub mod stream;
pub mod timeline;
pub mod ttl;

pub use conflict::ConflictContext;
pub use credentials::{AccessTier, AgentCredentials};
pub use pagination::PaginatedResult;
pub use pattern::StagedPattern;
pub use record::{QueueEntry, StoredRecord};
pub use session::Session;
pub use signal::Signal;
pub use stream::{StreamEntry, StreamEvent, StreamId};
pub use timeline::{TimeWindow, TimelineEvent};
pub use ttl::TtlStrategy;
