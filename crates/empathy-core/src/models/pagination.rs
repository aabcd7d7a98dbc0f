//! Cursor pagination over a key namespace.

use serde::{Deserialize, Serialize};

use crate::errors::{MemoryError, MemoryResult};

/// Cursor value that both starts and ends an enumeration.
pub const START_CURSOR: &str = "0";

/// One page of a cursor enumeration.
///
/// Feed `cursor` back into the next call until `has_more` is false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub cursor: String,
    pub has_more: bool,
    /// Keys returned by the underlying scan for this page.
    pub total_scanned: usize,
}

impl<T> PaginatedResult<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            cursor: START_CURSOR.to_string(),
            has_more: false,
            total_scanned: 0,
        }
    }

    pub fn from_scan(items: Vec<T>, next_cursor: u64, total_scanned: usize) -> Self {
        Self {
            items,
            cursor: next_cursor.to_string(),
            has_more: next_cursor != 0,
            total_scanned,
        }
    }
}

/// Parse an opaque cursor token. Empty strings are treated as the start.
pub fn parse_cursor(cursor: &str) -> MemoryResult<u64> {
    let trimmed = cursor.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed
        .parse::<u64>()
        .map_err(|_| MemoryError::validation(format!("invalid cursor: {cursor:?}")))
}
