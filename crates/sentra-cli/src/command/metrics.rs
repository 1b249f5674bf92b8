//! `sentra metrics ...`

use sentra_cache::MetricsTracker;

use crate::config::MetricsCommand;

pub async fn run(tracker: &MetricsTracker, command: &MetricsCommand) -> anyhow::Result<String> {
    match command {
        MetricsCommand::Show => snapshot(tracker).await,
        MetricsCommand::Record {
            kind,
            latency,
            similarity,
        } => {
            if !latency.is_finite() || *latency < 0.0 {
                anyhow::bail!("latency must be a non-negative number of milliseconds");
            }
            if let Some(similarity) = similarity
                && !(0.0..=1.0).contains(similarity)
            {
                anyhow::bail!("similarity must be within [0, 1]");
            }

            tracker.record_query(*kind, *latency, *similarity).await;
            snapshot(tracker).await
        }
        MetricsCommand::Reset => {
            tracker.reset().await;
            snapshot(tracker).await
        }
        MetricsCommand::Export => Ok(tracker.export().await?),
    }
}

async fn snapshot(tracker: &MetricsTracker) -> anyhow::Result<String> {
    let snapshot = tracker.get_metrics().await;
    Ok(serde_json::to_string_pretty(&snapshot)?)
}
