#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod expiry;

pub mod metrics;
pub mod query;
pub mod semantic;

pub use metrics::{CacheMetrics, MetricsSnapshot, MetricsTracker, QueryKind};
pub use query::{QueryCache, QueryCacheConfig, QueryCacheEntry, QueryCacheStats};
pub use semantic::{SemanticCache, SemanticCacheConfig, SemanticCacheStats, SemanticMatch};
