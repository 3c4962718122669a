// Error types for the comparison pipeline and its stores.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("invalid position `{0}`: must be one of GK, DEF, MID, FWD")]
    InvalidPosition(String),

    #[error("result size must be a positive integer")]
    InvalidTopN,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failures reading or writing a persisted artifact. These are surfaced to the
/// caller unmodified; an unreadable cache is not repaired.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },
}
