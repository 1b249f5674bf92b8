//! Cache hit/miss metrics.
//!
//! [`CacheMetrics`] is the plain value: counters, running averages and the
//! observation period. [`MetricsTracker`] is the shared handle that the
//! diagnosis pipeline records into and the hosting process persists.

mod kind;
mod record;
mod tracker;

pub use kind::QueryKind;
pub use record::{CacheMetrics, MetricsSnapshot};
pub use tracker::MetricsTracker;

/// Tracing target for metrics operations.
pub const TRACING_TARGET: &str = "sentra_cache::metrics";
