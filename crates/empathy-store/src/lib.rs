//! # empathy-store
//!
//! The two [`IKeyValueStore`] implementations:
//!
//! - [`InMemoryStore`]: process-local, hermetic, used by tests and offline mode.
//!   TTL is honored by filtering expired entries on read.
//! - [`RedisStore`] (feature `redis`): networked client over a small
//!   connection pool. Blocking commands and watched transactions check out
//!   their own connection so they never stall unrelated callers.

pub mod clock;
pub mod glob;
pub mod memory;
#[cfg(feature = "redis")]
pub mod networked;

pub use clock::{Clock, ManualClock, SystemClock};
pub use empathy_core::traits::IKeyValueStore;
pub use memory::InMemoryStore;
#[cfg(feature = "redis")]
pub use networked::RedisStore;
