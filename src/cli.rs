//! Command-line interface components.
//!
//! Every option can also be supplied through the environment variable named
//! in its help text, so a deployment can be configured entirely from the
//! environment.

use crate::config::{CleanerConfig, CompressionAlgorithm};
use crate::error::Result;
use clap::{ArgAction, Parser, builder::BoolishValueParser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "account_log_cleaner")]
#[command(about = "Clean ValidationOk / ValidationError account logs into Parquet and SQLite")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Directory containing the validation log files
    #[arg(long, env = "LOGS_INPUT_PATH", default_value = "./data/input")]
    pub input_path: PathBuf,

    /// Directory for archival parquet files
    #[arg(long, env = "PARQUET_PATH", default_value = "./data/parquet")]
    pub parquet_path: PathBuf,

    /// SQLite database receiving the cleaned records
    #[arg(long, env = "DATABASE_PATH", default_value = "./data/account_logs.db")]
    pub database_path: PathBuf,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Also write logs to this file
    #[arg(long, env = "LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Rows per database insert chunk
    #[arg(long, env = "CHUNK_SIZE", default_value_t = 5000)]
    pub chunk_size: usize,

    /// Files per processing batch
    #[arg(long, env = "BATCH_SIZE", default_value_t = 1000)]
    pub batch_size: usize,

    /// Files processed concurrently
    #[arg(long, env = "MAX_WORKERS", default_value_t = 4)]
    pub max_workers: usize,

    /// Write archival parquet files
    #[arg(long, env = "ENABLE_PARQUET", default_value_t = true, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub enable_parquet: bool,

    /// Insert records into the database
    #[arg(long, env = "ENABLE_DB_INSERT", default_value_t = true, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub enable_db_insert: bool,

    /// Run the pipeline without database writes or moving source files
    #[arg(long, env = "DRY_RUN", default_value_t = false, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub dry_run: bool,

    /// Move processed source files into a timestamped subdirectory
    #[arg(long, env = "ARCHIVE_SOURCES", default_value_t = true, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub archive_sources: bool,

    /// Parquet compression algorithm (snappy, zstd, lz4, none)
    #[arg(long, env = "PARQUET_COMPRESSION", default_value = "snappy")]
    pub compression: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Log level after applying `--verbose`
    pub fn effective_log_level(&self) -> &str {
        if self.verbose { "debug" } else { self.log_level.as_str() }
    }

    /// Build and validate the run configuration
    pub fn into_config(self) -> Result<CleanerConfig> {
        let compression = CompressionAlgorithm::parse(&self.compression)?;
        let log_level = self.effective_log_level().to_string();

        let config = CleanerConfig {
            input_path: self.input_path,
            parquet_path: self.parquet_path,
            database_path: self.database_path,
            log_level,
            log_file: self.log_file,
            chunk_size: self.chunk_size,
            batch_size: self.batch_size,
            max_workers: self.max_workers,
            enable_archive: self.enable_parquet,
            enable_db_insert: self.enable_db_insert,
            dry_run: self.dry_run,
            archive_sources: self.archive_sources,
            compression,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CleanerError;

    #[test]
    fn test_flags_override_defaults() {
        let args = Args::try_parse_from([
            "account_log_cleaner",
            "--input-path",
            "/srv/logs",
            "--chunk-size",
            "100",
            "--enable-db-insert",
            "false",
            "--dry-run",
            "yes",
            "--compression",
            "zstd",
            "-v",
        ])
        .unwrap();
        assert_eq!(args.effective_log_level(), "debug");

        let config = args.into_config().unwrap();
        assert_eq!(config.input_path, PathBuf::from("/srv/logs"));
        assert_eq!(config.chunk_size, 100);
        assert!(!config.enable_db_insert);
        assert!(config.dry_run);
        assert_eq!(config.compression, CompressionAlgorithm::Zstd);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let args = Args::try_parse_from(["account_log_cleaner", "--max-workers", "0"]).unwrap();
        assert!(matches!(
            args.into_config(),
            Err(CleanerError::Configuration { .. })
        ));

        let args =
            Args::try_parse_from(["account_log_cleaner", "--compression", "brotli"]).unwrap();
        assert!(args.into_config().is_err());
    }
}
