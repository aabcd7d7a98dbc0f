//! Cursor pagination over key namespaces.

use empathy_core::errors::{MemoryError, MemoryResult};
use empathy_core::models::pagination::parse_cursor;
use empathy_core::models::{AgentCredentials, PaginatedResult};

use crate::context::{OrDegraded, StoreContext};
use crate::keys::Namespace;

/// Wraps the store's cursor scan. Feeding each returned cursor back in
/// visits every key of a stable key set; `has_more == false` ends the walk.
pub struct Pagination {
    ctx: StoreContext,
    staged: Namespace,
    default_count: usize,
}

impl Pagination {
    pub fn new(ctx: StoreContext, staged_prefix: impl Into<String>, default_count: usize) -> Self {
        Self {
            ctx,
            staged: Namespace::new(staged_prefix),
            default_count,
        }
    }

    pub fn default_count(&self) -> usize {
        self.default_count
    }

    /// One page of staged pattern ids.
    pub fn list_staged_patterns_paginated(
        &self,
        creds: &AgentCredentials,
        cursor: &str,
        count: usize,
    ) -> MemoryResult<PaginatedResult<String>> {
        let _timer = self.ctx.timer("list_staged_patterns_paginated");
        let page = self.scan_page(&self.staged.pattern(), cursor, count)?;
        tracing::debug!(agent_id = %creds.agent_id, cursor = %cursor, returned = page.items.len(), "listed staged page");
        Ok(PaginatedResult {
            items: page
                .items
                .iter()
                .filter_map(|k| self.staged.id_of(k))
                .map(str::to_string)
                .collect(),
            cursor: page.cursor,
            has_more: page.has_more,
            total_scanned: page.total_scanned,
        })
    }

    /// One page of full keys matching a glob `pattern`.
    pub fn scan_keys(
        &self,
        pattern: &str,
        cursor: &str,
        count: usize,
    ) -> MemoryResult<PaginatedResult<String>> {
        let _timer = self.ctx.timer("scan_keys");
        if pattern.is_empty() {
            return Err(MemoryError::validation("pattern cannot be empty"));
        }
        self.scan_page(pattern, cursor, count)
    }

    fn scan_page(
        &self,
        pattern: &str,
        cursor: &str,
        count: usize,
    ) -> MemoryResult<PaginatedResult<String>> {
        let cursor = parse_cursor(cursor)?;
        if count == 0 {
            return Err(MemoryError::validation("count must be greater than 0"));
        }
        self.ctx
            .store()
            .scan(cursor, pattern, count)
            .map(|(next, keys)| {
                let scanned = keys.len();
                PaginatedResult::from_scan(keys, next, scanned)
            })
            .or_degraded("scan", PaginatedResult::empty())
    }
}
