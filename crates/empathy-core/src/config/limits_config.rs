use serde::{Deserialize, Serialize};

use super::defaults;

/// Paging, batching, and cache limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub default_page_size: usize,
    pub default_stream_max_len: usize,
    pub default_stream_read_count: usize,
    /// Upper bound on items per `stash_batch` call.
    pub max_batch_size: usize,
    /// 0 disables the staged-pattern read-through cache.
    pub pattern_cache_capacity: u64,
    pub pattern_cache_ttl_secs: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            default_page_size: defaults::DEFAULT_PAGE_SIZE,
            default_stream_max_len: defaults::DEFAULT_STREAM_MAX_LEN,
            default_stream_read_count: defaults::DEFAULT_STREAM_READ_COUNT,
            max_batch_size: defaults::DEFAULT_MAX_BATCH_SIZE,
            pattern_cache_capacity: defaults::DEFAULT_PATTERN_CACHE_CAPACITY,
            pattern_cache_ttl_secs: defaults::DEFAULT_PATTERN_CACHE_TTL_SECS,
        }
    }
}
