//! Account Log Cleaner Library
//!
//! Cleans tab-delimited bank account validation logs (`ValidationOk*.txt`
//! and `ValidationError*.txt`) into uniform, size-constrained records.
//!
//! This library provides tools for:
//! - Classifying log files into one of two fixed record layouts by name
//! - Tolerant tab-delimited parsing with a per-line outcome report
//! - Recovering error lines whose JSON status payload was split by tabs
//! - Mapping positional fields to named columns, stripping `label:` prefixes
//! - Enriching records with date and provenance metadata
//! - Truncating values to their destination column widths
//! - Writing archival Parquet files and inserting into SQLite

pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod parser;
pub mod processor;
pub mod schema;
pub mod transform;

// Re-export commonly used types
pub use config::CleanerConfig;
pub use error::{CleanerError, Result};
pub use models::{Field, NormalizedRecord, ProcessedFile, ProcessingStats, RawRecord, RecordSchema};
pub use processor::BatchProcessor;
