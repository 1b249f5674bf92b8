//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── metrics: MetricsConfig  # tracker state file
//! ├── dataset: DatasetConfig  # disease table override
//! └── command: Command        # disease | metrics
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.

mod dataset;
mod metrics;

use std::process;
use std::str::FromStr;

use anyhow::Context;
use clap::{Parser, Subcommand};
pub use dataset::DatasetConfig;
pub use metrics::MetricsConfig;
use sentra_cache::QueryKind;
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_STARTUP;

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "sentra")]
#[command(about = "Sentra clinical decision support core")]
#[command(version)]
pub struct Cli {
    /// Metrics tracker persistence.
    #[clap(flatten)]
    pub metrics: MetricsConfig,

    /// Disease table source.
    #[clap(flatten)]
    pub dataset: DatasetConfig,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level subcommands.
#[derive(Debug, Clone, Subcommand, Serialize, Deserialize)]
pub enum Command {
    /// Look diseases up in the Puskesmas table.
    #[command(subcommand)]
    Disease(DiseaseCommand),

    /// Inspect or update the cache metrics tracker.
    #[command(subcommand)]
    Metrics(MetricsCommand),
}

/// Disease table lookups.
#[derive(Debug, Clone, Subcommand, Serialize, Deserialize)]
pub enum DiseaseCommand {
    /// Finds a disease by exact or contained name.
    Find { name: String },

    /// Finds the disease whose symptoms best match the given ones.
    Symptoms {
        #[arg(required = true)]
        symptoms: Vec<String>,
    },

    /// Lists every disease whose name contains the query.
    Search { query: String },

    /// Lists every disease in the table.
    List,

    /// Tells whether a disease can be treated at the Puskesmas.
    Treatable { name: String },
}

/// Metrics tracker operations.
#[derive(Debug, Clone, Subcommand, Serialize, Deserialize)]
pub enum MetricsCommand {
    /// Prints the current metrics with derived rates.
    Show,

    /// Records one query outcome.
    Record {
        /// One of `semantic_hit`, `exact_hit` or `miss`.
        #[arg(value_parser = QueryKind::from_str)]
        kind: QueryKind,

        /// Observed latency in milliseconds.
        latency: f64,

        /// Cosine similarity of a semantic hit.
        #[arg(long)]
        similarity: Option<f64>,
    },

    /// Zeroes every counter and average.
    Reset,

    /// Prints the persisted JSON form of the metrics.
    Export,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.metrics
            .validate()
            .context("invalid metrics configuration")?;
        self.dataset
            .validate()
            .context("invalid dataset configuration")?;
        Ok(())
    }

    /// Logs configuration at debug level.
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            features = ?Self::enabled_features(),
            "build information"
        );

        self.metrics.log();
        self.dataset.log();
    }

    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_metrics_record() -> anyhow::Result<()> {
        let cli = Cli::try_parse_from([
            "sentra",
            "--metrics-path",
            "/tmp/metrics.json",
            "metrics",
            "record",
            "semantic_hit",
            "42.5",
            "--similarity",
            "0.97",
        ])?;

        let Command::Metrics(MetricsCommand::Record {
            kind,
            latency,
            similarity,
        }) = cli.command
        else {
            panic!("expected metrics record");
        };
        assert_eq!(kind, QueryKind::SemanticHit);
        assert_eq!(latency, 42.5);
        assert_eq!(similarity, Some(0.97));
        Ok(())
    }

    #[test]
    fn unknown_query_kind_is_rejected() {
        let parsed = Cli::try_parse_from(["sentra", "metrics", "record", "bogus", "1.0"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn symptoms_require_at_least_one_value() {
        assert!(Cli::try_parse_from(["sentra", "disease", "symptoms"]).is_err());
    }
}
