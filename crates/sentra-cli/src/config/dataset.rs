//! Disease table configuration.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use sentra_puskesmas::DiseaseMatcher;
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_CONFIG;

/// Source of the Puskesmas disease table.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Args)]
pub struct DatasetConfig {
    /// JSON disease table replacing the bundled one.
    #[arg(long = "disease-table", env = "SENTRA_DISEASE_TABLE")]
    pub table: Option<PathBuf>,
}

impl DatasetConfig {
    /// Validates the dataset configuration.
    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(table) = &self.table
            && !table.is_file()
        {
            anyhow::bail!("disease table '{}' is not a file", table.display());
        }

        Ok(())
    }

    /// Loads the configured table, falling back to the bundled one.
    pub fn load(&self) -> anyhow::Result<DiseaseMatcher> {
        match &self.table {
            Some(table) => DiseaseMatcher::from_path(table)
                .with_context(|| format!("failed to load disease table '{}'", table.display())),
            None => DiseaseMatcher::bundled().context("failed to load bundled disease table"),
        }
    }

    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_CONFIG,
            table = ?self.table,
            bundled = self.table.is_none(),
            "dataset configuration"
        );
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn missing_table_is_rejected() {
        let config = DatasetConfig {
            table: Some(PathBuf::from("/nonexistent/sentra/table.json")),
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn loads_override_table() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(
            file,
            r#"[{{"nama_penyakit":"Skabies","gejala_klinis":["gatal malam hari"]}}]"#
        )?;

        let config = DatasetConfig {
            table: Some(file.path().to_path_buf()),
        };
        config.validate()?;
        let matcher = config.load()?;

        assert_eq!(matcher.list_all().len(), 1);
        assert!(matcher.find_by_name("skabies").is_some());
        Ok(())
    }

    #[test]
    fn defaults_to_bundled_table() -> anyhow::Result<()> {
        let matcher = DatasetConfig::default().load()?;
        assert!(matcher.find_by_name("Influenza").is_some());
        Ok(())
    }
}
