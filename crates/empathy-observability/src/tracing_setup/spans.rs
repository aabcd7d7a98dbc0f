//! Span definitions per operation family.

/// Span for a single manager operation on a key.
#[macro_export]
macro_rules! memory_op_span {
    ($op:expr, $agent_id:expr, $key:expr) => {
        tracing::debug_span!("empathy.memory", op = $op, agent_id = %$agent_id, key = %$key)
    };
}

/// Span for an optimistic transaction.
#[macro_export]
macro_rules! transaction_span {
    ($kind:expr, $key:expr) => {
        tracing::info_span!("empathy.transaction", kind = $kind, key = %$key)
    };
}

/// Span for a blocking read (queue pop, stream tail-read).
#[macro_export]
macro_rules! blocking_read_span {
    ($resource:expr, $timeout_ms:expr) => {
        tracing::debug_span!("empathy.blocking_read", resource = %$resource, timeout_ms = $timeout_ms)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const MEMORY: &str = "empathy.memory";
    pub const TRANSACTION: &str = "empathy.transaction";
    pub const BLOCKING_READ: &str = "empathy.blocking_read";
}
