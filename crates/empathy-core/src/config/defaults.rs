// Single source of truth for all default values.

// --- Store ---
pub const DEFAULT_BACKEND: &str = "memory";
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379/0";
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 2_000;
pub const DEFAULT_POOL_SIZE: usize = 4;
pub const DEFAULT_FALLBACK_TO_MEMORY: bool = true;

// --- Keyspace ---
pub const DEFAULT_WORKING_PREFIX: &str = "working:";
pub const DEFAULT_STAGED_PREFIX: &str = "empathy:staged:";
pub const DEFAULT_CONFLICT_PREFIX: &str = "empathy:conflict:";
pub const DEFAULT_SESSION_PREFIX: &str = "empathy:session:";
pub const DEFAULT_SIGNAL_PREFIX: &str = "empathy:signal:";
pub const DEFAULT_QUEUE_PREFIX: &str = "queue:";
pub const DEFAULT_STREAM_PREFIX: &str = "stream:";
pub const DEFAULT_TIMELINE_PREFIX: &str = "timeline:";

// --- Limits ---
pub const DEFAULT_PAGE_SIZE: usize = 100;
pub const DEFAULT_STREAM_MAX_LEN: usize = 10_000;
pub const DEFAULT_STREAM_READ_COUNT: usize = 100;
pub const DEFAULT_MAX_BATCH_SIZE: usize = 1_000;
pub const DEFAULT_PATTERN_CACHE_CAPACITY: u64 = 1_024;
pub const DEFAULT_PATTERN_CACHE_TTL_SECS: u64 = 30;

// --- Privacy ---
pub const DEFAULT_PRIVACY_ENABLED: bool = true;

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_JSON_LOGS: bool = false;
pub const DEFAULT_METRICS_HISTORY: usize = 1_000;
