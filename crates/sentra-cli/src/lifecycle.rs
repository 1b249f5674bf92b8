//! Metrics tracker lifecycle: import at startup, export at shutdown.

use std::io::ErrorKind;
use std::path::Path;

use anyhow::Context;
use sentra_cache::MetricsTracker;

use crate::config::MetricsConfig;
use crate::{TRACING_TARGET_SHUTDOWN, TRACING_TARGET_STARTUP};

/// Creates the tracker and restores the persisted state, if any.
///
/// A missing state file starts a fresh period. A malformed one is logged
/// and ignored so a corrupt file never blocks the command.
pub async fn open_tracker(config: &MetricsConfig) -> anyhow::Result<MetricsTracker> {
    let tracker = MetricsTracker::new();
    let Some(path) = &config.path else {
        return Ok(tracker);
    };

    let serialized = match tokio::fs::read_to_string(path).await {
        Ok(serialized) => serialized,
        Err(error) if error.kind() == ErrorKind::NotFound => {
            tracing::info!(
                target: TRACING_TARGET_STARTUP,
                path = %path.display(),
                "no metrics state found, starting fresh"
            );
            return Ok(tracker);
        }
        Err(error) => {
            return Err(error)
                .with_context(|| format!("failed to read metrics state '{}'", path.display()));
        }
    };

    if let Err(error) = tracker.import(&serialized).await {
        tracing::warn!(
            target: TRACING_TARGET_STARTUP,
            path = %path.display(),
            error = %error,
            "ignoring malformed metrics state"
        );
    }

    Ok(tracker)
}

/// Writes the tracker state back to the configured file.
pub async fn close_tracker(tracker: &MetricsTracker, config: &MetricsConfig) -> anyhow::Result<()> {
    let Some(path) = &config.path else {
        return Ok(());
    };

    let serialized = tracker.export().await.context("failed to export metrics")?;
    write_state(path, &serialized).await?;

    tracing::debug!(
        target: TRACING_TARGET_SHUTDOWN,
        path = %path.display(),
        "metrics state saved"
    );
    Ok(())
}

async fn write_state(path: &Path, serialized: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create '{}'", parent.display()))?;
    }

    tokio::fs::write(path, serialized)
        .await
        .with_context(|| format!("failed to write metrics state '{}'", path.display()))
}

#[cfg(test)]
mod tests {
    use sentra_cache::QueryKind;

    use super::*;

    #[tokio::test]
    async fn state_survives_a_restart() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let config = MetricsConfig {
            path: Some(dir.path().join("state").join("metrics.json")),
        };

        let tracker = open_tracker(&config).await?;
        assert_eq!(tracker.get_metrics().await.metrics.total_queries(), 0);
        tracker.record_query(QueryKind::ExactHit, 12.0, None).await;
        tracker.record_query(QueryKind::Miss, 900.0, None).await;
        close_tracker(&tracker, &config).await?;

        let restored = open_tracker(&config).await?;
        let metrics = restored.get_metrics().await.metrics;
        assert_eq!(metrics.total_queries(), 2);
        assert_eq!(metrics.exact_hits(), 1);
        assert_eq!(metrics.misses(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn malformed_state_starts_fresh() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("metrics.json");
        std::fs::write(&path, "{not json")?;

        let config = MetricsConfig { path: Some(path) };
        let tracker = open_tracker(&config).await?;
        assert_eq!(tracker.get_metrics().await.metrics.total_queries(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn without_path_nothing_is_written() -> anyhow::Result<()> {
        let config = MetricsConfig::default();
        let tracker = open_tracker(&config).await?;
        close_tracker(&tracker, &config).await?;
        Ok(())
    }
}
