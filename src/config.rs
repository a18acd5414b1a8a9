//! Configuration management and validation.
//!
//! Provides the run configuration for the cleaner: input and output
//! locations, sink switches, batching parameters and logging settings.
//! Values normally arrive from environment variables through the CLI
//! layer; [`CleanerConfig::default`] mirrors the documented defaults.

use crate::error::{CleanerError, Result};
use polars::prelude::ParquetCompression;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

/// Supported compression algorithms for archival parquet files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompressionAlgorithm {
    /// Snappy compression - good balance of speed and compression
    Snappy,
    /// ZSTD compression - better compression ratio, slower
    Zstd,
    /// LZ4 compression - fastest, lower compression ratio
    Lz4,
    /// No compression
    Uncompressed,
}

impl CompressionAlgorithm {
    /// Convert to polars ParquetCompression type
    pub fn to_polars_compression(&self) -> ParquetCompression {
        match self {
            CompressionAlgorithm::Snappy => ParquetCompression::Snappy,
            CompressionAlgorithm::Zstd => ParquetCompression::Zstd(None),
            CompressionAlgorithm::Lz4 => ParquetCompression::Lz4Raw,
            CompressionAlgorithm::Uncompressed => ParquetCompression::Uncompressed,
        }
    }

    /// Parse a compression name as given on the command line
    pub fn parse(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "snappy" => Ok(Self::Snappy),
            "zstd" => Ok(Self::Zstd),
            "lz4" => Ok(Self::Lz4),
            "none" | "uncompressed" => Ok(Self::Uncompressed),
            other => Err(CleanerError::Configuration {
                message: format!(
                    "Unknown compression '{}' (expected snappy, zstd, lz4 or none)",
                    other
                ),
            }),
        }
    }
}

/// Global configuration for a cleaning run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanerConfig {
    /// Directory scanned for validation log files
    pub input_path: PathBuf,

    /// Directory receiving archival parquet files
    pub parquet_path: PathBuf,

    /// SQLite database receiving relational inserts
    pub database_path: PathBuf,

    /// Log level for this crate's targets
    pub log_level: String,

    /// Optional log file written alongside stderr
    pub log_file: Option<PathBuf>,

    /// Rows per relational insert chunk
    pub chunk_size: usize,

    /// Files per processing batch
    pub batch_size: usize,

    /// Files processed concurrently
    pub max_workers: usize,

    /// Write archival parquet files
    pub enable_archive: bool,

    /// Insert records into the database
    pub enable_db_insert: bool,

    /// Run the full pipeline but skip the relational write and source relocation
    pub dry_run: bool,

    /// Move processed source files into a timestamped subdirectory
    pub archive_sources: bool,

    /// Parquet compression for archival output
    pub compression: CompressionAlgorithm,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("./data/input"),
            parquet_path: PathBuf::from("./data/parquet"),
            database_path: PathBuf::from("./data/account_logs.db"),
            log_level: "info".to_string(),
            log_file: None,
            chunk_size: 5000,
            batch_size: 1000,
            max_workers: 4,
            enable_archive: true,
            enable_db_insert: true,
            dry_run: false,
            archive_sources: true,
            compression: CompressionAlgorithm::Snappy,
        }
    }
}

impl CleanerConfig {
    /// Set the input directory
    pub fn with_input_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_path = path.into();
        self
    }

    /// Set the parquet output directory
    pub fn with_parquet_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.parquet_path = path.into();
        self
    }

    /// Set the database file
    pub fn with_database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_path = path.into();
        self
    }

    /// Set the insert chunk size
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Set the number of files per batch
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set the number of concurrently processed files
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }

    /// Disable archival parquet output
    pub fn without_archive(mut self) -> Self {
        self.enable_archive = false;
        self
    }

    /// Disable database inserts
    pub fn without_db_insert(mut self) -> Self {
        self.enable_db_insert = false;
        self
    }

    /// Leave source files in place after processing
    pub fn without_source_archiving(mut self) -> Self {
        self.archive_sources = false;
        self
    }

    /// Enable dry-run mode
    pub fn with_dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    /// Check the configuration, reporting every problem at once
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if self.input_path.as_os_str().is_empty() {
            errors.push("input path must be configured".to_string());
        }
        if self.chunk_size == 0 {
            errors.push("chunk size must be greater than 0".to_string());
        }
        if self.batch_size == 0 {
            errors.push("batch size must be greater than 0".to_string());
        }
        if self.max_workers == 0 {
            errors.push("max workers must be greater than 0".to_string());
        }
        if self.enable_archive && self.parquet_path.as_os_str().is_empty() {
            errors.push("parquet path must be configured when archiving is enabled".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(CleanerError::Configuration {
                message: errors.join("; "),
            })
        }
    }

    /// Create the output directories this configuration writes into
    pub fn prepare_directories(&self) -> Result<()> {
        let mut dirs = Vec::new();
        if self.enable_archive {
            dirs.push(self.parquet_path.clone());
        }
        if self.enable_db_insert
            && !self.dry_run
            && let Some(parent) = self.database_path.parent()
        {
            dirs.push(parent.to_path_buf());
        }
        if let Some(parent) = self.log_file.as_ref().and_then(|f| f.parent()) {
            dirs.push(parent.to_path_buf());
        }

        for dir in dirs.into_iter().filter(|d| !d.as_os_str().is_empty()) {
            debug!("Ensuring directory exists: {}", dir.display());
            std::fs::create_dir_all(&dir)?;
        }
        Ok(())
    }
}
