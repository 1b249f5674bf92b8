//! Metrics tracker persistence configuration.

use std::path::PathBuf;

use clap::Args;
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_CONFIG;

/// Where the metrics tracker state lives between runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Args)]
pub struct MetricsConfig {
    /// JSON file the tracker is imported from at startup and exported to at
    /// shutdown. Without it the tracker lives for one invocation only.
    #[arg(long = "metrics-path", env = "SENTRA_METRICS_PATH")]
    pub path: Option<PathBuf>,
}

impl MetricsConfig {
    /// Validates the metrics configuration.
    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(path) = &self.path
            && path.is_dir()
        {
            anyhow::bail!("metrics path '{}' is a directory", path.display());
        }

        Ok(())
    }

    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_CONFIG,
            path = ?self.path,
            "metrics configuration"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_is_rejected() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;

        let config = MetricsConfig {
            path: Some(dir.path().to_path_buf()),
        };
        assert!(config.validate().is_err());

        let config = MetricsConfig {
            path: Some(dir.path().join("metrics.json")),
        };
        assert!(config.validate().is_ok());
        assert!(MetricsConfig::default().validate().is_ok());
        Ok(())
    }
}
