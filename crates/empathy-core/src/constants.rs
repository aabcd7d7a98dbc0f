/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Longest accepted key, id, or queue/stream/timeline name.
pub const MAX_KEY_LENGTH: usize = 512;

/// Scan page size used when a manager enumerates a whole namespace.
pub const FULL_SCAN_BATCH: usize = 500;

/// Target used for broadcast coordination signals.
pub const BROADCAST_TARGET: &str = "broadcast";
