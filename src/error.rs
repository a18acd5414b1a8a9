//! Error handling for account log processing.
//!
//! Per-file failures (unrecognised names, undecodable content, broken
//! invariants in the cleaning stages, sink failures) are kept apart from
//! environment-level failures so the batch orchestrator can decide whether
//! to skip a file or stop the run.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CleanerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Input directory not found: {path}")]
    InputNotFound { path: PathBuf },

    #[error("Unrecognized file type: {file_name}")]
    UnrecognizedFileType { file_name: String },

    #[error("Parse failure in file: {path} - {reason}")]
    ParseFailure { path: PathBuf, reason: String },

    /// Informational only: recovery salvaged nothing from the file.
    #[error("Recovery salvaged no lines from file: {path}")]
    RecoveryDegraded { path: PathBuf },

    #[error("Normalization failed: {reason}")]
    NormalizationFailure { reason: String },

    #[error("Enrichment failed: {reason}")]
    EnrichmentFailure { reason: String },

    #[error("Sink '{sink}' failed: {reason}")]
    SinkFailure { sink: String, reason: String },

    #[error("Failed to archive {path}: {reason}")]
    Archive { path: PathBuf, reason: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl CleanerError {
    /// Wrap any error raised inside a sink
    pub fn sink(sink: impl Into<String>, error: impl std::fmt::Display) -> Self {
        Self::SinkFailure {
            sink: sink.into(),
            reason: error.to_string(),
        }
    }

    /// Whether this error aborts only the file being processed.
    ///
    /// Everything else (missing input directory, bad configuration,
    /// archive failures) is a batch-level condition.
    pub fn is_file_scoped(&self) -> bool {
        matches!(
            self,
            CleanerError::UnrecognizedFileType { .. }
                | CleanerError::ParseFailure { .. }
                | CleanerError::RecoveryDegraded { .. }
                | CleanerError::NormalizationFailure { .. }
                | CleanerError::EnrichmentFailure { .. }
                | CleanerError::SinkFailure { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CleanerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_scoped_errors() {
        let unrecognized = CleanerError::UnrecognizedFileType {
            file_name: "notes.txt".to_string(),
        };
        assert!(unrecognized.is_file_scoped());

        let sink = CleanerError::sink("sqlite", "disk full");
        assert!(sink.is_file_scoped());
        assert_eq!(sink.to_string(), "Sink 'sqlite' failed: disk full");

        let missing = CleanerError::InputNotFound {
            path: PathBuf::from("/nowhere"),
        };
        assert!(!missing.is_file_scoped());
    }
}
