use std::path::PathBuf;

/// Result type for disease table loading.
pub type Result<T, E = DatasetError> = std::result::Result<T, E>;

/// Failure to load a disease table.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// The table file could not be read.
    #[error("failed to read disease table {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The table is not a JSON array of disease records.
    #[error("malformed disease table: {0}")]
    Parse(#[from] serde_json::Error),
}
