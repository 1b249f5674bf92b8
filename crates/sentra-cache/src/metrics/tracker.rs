//! Shared metrics handle.

use std::sync::Arc;

use sentra_core::Result;
use tokio::sync::RwLock;

use super::{CacheMetrics, MetricsSnapshot, QueryKind, TRACING_TARGET};

/// Cloneable handle over one [`CacheMetrics`] value.
///
/// Every operation holds the lock for its whole read-modify-write, so
/// concurrent recordings are never lost.
#[derive(Debug, Clone, Default)]
pub struct MetricsTracker {
    inner: Arc<RwLock<CacheMetrics>>,
}

impl MetricsTracker {
    /// Creates a tracker with empty metrics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one lookup outcome.
    pub async fn record_query(&self, kind: QueryKind, latency_ms: f64, similarity: Option<f64>) {
        let mut metrics = self.inner.write().await;
        metrics.record(kind, latency_ms, similarity);

        tracing::trace!(
            target: TRACING_TARGET,
            kind = kind.as_ref(),
            latency_ms,
            similarity,
            total_queries = metrics.total_queries(),
            "query recorded"
        );
    }

    /// Returns the current metrics with derived rates.
    pub async fn get_metrics(&self) -> MetricsSnapshot {
        self.inner.read().await.snapshot()
    }

    /// Discards every counter and starts a new period.
    pub async fn reset(&self) {
        let mut metrics = self.inner.write().await;
        *metrics = CacheMetrics::new();

        tracing::info!(target: TRACING_TARGET, "cache metrics reset");
    }

    /// Serializes the current snapshot to pretty-printed JSON.
    pub async fn export(&self) -> Result<String> {
        let snapshot = self.get_metrics().await;
        Ok(serde_json::to_string_pretty(&snapshot)?)
    }

    /// Replaces the current metrics with a previously exported document.
    ///
    /// On failure the error is logged and returned, and the current metrics
    /// are left untouched.
    pub async fn import(&self, serialized: &str) -> Result<()> {
        let imported = match CacheMetrics::from_json(serialized) {
            Ok(imported) => imported,
            Err(error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %error,
                    "failed to import cache metrics"
                );
                return Err(error);
            }
        };

        let total_queries = imported.total_queries();
        *self.inner.write().await = imported;

        tracing::debug!(target: TRACING_TARGET, total_queries, "cache metrics imported");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn import_of_export_restores_counters() -> anyhow::Result<()> {
        let tracker = MetricsTracker::new();
        tracker.record_query(QueryKind::Miss, 950.0, None).await;
        tracker.record_query(QueryKind::ExactHit, 3.0, None).await;
        tracker.record_query(QueryKind::SemanticHit, 41.0, Some(0.96)).await;

        let exported = tracker.export().await?;
        let restored = MetricsTracker::new();
        restored.import(&exported).await?;

        let before = tracker.get_metrics().await.metrics;
        let after = restored.get_metrics().await.metrics;
        assert_eq!(after.total_queries(), before.total_queries());
        assert_eq!(after.semantic_hits(), before.semantic_hits());
        assert_eq!(after.exact_hits(), before.exact_hits());
        assert_eq!(after.misses(), before.misses());
        assert_eq!(after.avg_latency_hit(), before.avg_latency_hit());
        assert_eq!(after.avg_latency_miss(), before.avg_latency_miss());
        assert!((after.avg_similarity() - before.avg_similarity()).abs() < 1e-12);

        Ok(())
    }

    #[tokio::test]
    async fn malformed_import_leaves_state_intact() {
        let tracker = MetricsTracker::new();
        tracker.record_query(QueryKind::Miss, 10.0, None).await;

        assert!(tracker.import("{ broken").await.is_err());
        assert_eq!(tracker.get_metrics().await.metrics.misses(), 1);
    }

    #[tokio::test]
    async fn reset_clears_counters() {
        let tracker = MetricsTracker::new();
        tracker.record_query(QueryKind::ExactHit, 1.0, None).await;

        tracker.reset().await;

        let snapshot = tracker.get_metrics().await;
        assert_eq!(snapshot.metrics.total_queries(), 0);
        assert_eq!(snapshot.hit_rate, 0.0);
    }

    #[tokio::test]
    async fn concurrent_recordings_are_not_lost() {
        let tracker = MetricsTracker::new();

        let handles: Vec<_> = (0..64)
            .map(|i| {
                let tracker = tracker.clone();
                tokio::spawn(async move {
                    let kind = if i % 2 == 0 { QueryKind::Miss } else { QueryKind::ExactHit };
                    tracker.record_query(kind, 10.0, None).await;
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        let metrics = tracker.get_metrics().await.metrics;
        assert_eq!(metrics.total_queries(), 64);
        assert_eq!(metrics.misses(), 32);
        assert_eq!(metrics.exact_hits(), 32);
        assert_eq!(metrics.avg_latency_miss(), 10.0);
    }
}
