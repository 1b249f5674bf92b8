//! Exact-match diagnosis cache.
//!
//! Queries are normalized (case, whitespace, trailing punctuation) and hashed,
//! so trivially different spellings of the same complaint share one entry.

mod cache;
mod key;

pub use cache::{QueryCache, QueryCacheConfig, QueryCacheEntry, QueryCacheStats};
pub use key::{normalize_query, query_key};

/// Tracing target for query cache operations.
pub const TRACING_TARGET: &str = "sentra_cache::query";
