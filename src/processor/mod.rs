//! Batch processing engine.
//!
//! Orchestrates a cleaning run: discovers the log files in the input
//! directory, runs each through the [`pipeline::FilePipeline`] on the
//! blocking pool, hands the results to the configured sinks and finally
//! relocates the successfully processed sources.

pub mod archive;
pub mod database;
pub mod discovery;
pub mod pipeline;
pub mod sink;
pub mod writer;

#[cfg(test)]
pub mod tests;

use self::{
    archive::SourceArchiver,
    database::SqliteSink,
    discovery::FileDiscovery,
    pipeline::FilePipeline,
    sink::{RecordSink, deliver},
    writer::ParquetSink,
};

use crate::config::CleanerConfig;
use crate::error::{CleanerError, Result};
use crate::models::{FileReport, FileStatus, ProcessedFile, ProcessingStats};
use crate::schema::classify_path;
use crate::transform::processing_timestamp;

use chrono::Local;
use colored::*;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::task;
use tracing::{debug, error, info, warn};

/// Main processor for a directory of validation logs
pub struct BatchProcessor {
    config: CleanerConfig,
    file_discovery: FileDiscovery,
    sinks: Vec<Box<dyn RecordSink>>,
    archiver: SourceArchiver,
}

impl BatchProcessor {
    /// Create a processor with the sinks enabled in `config`.
    ///
    /// The relational sink is not opened in dry-run mode.
    pub fn new(config: CleanerConfig) -> Result<Self> {
        config.validate()?;
        config.prepare_directories()?;

        let mut sinks: Vec<Box<dyn RecordSink>> = Vec::new();
        if config.enable_archive {
            sinks.push(Box::new(ParquetSink::new(
                config.parquet_path.clone(),
                config.compression,
            )));
        }
        if config.enable_db_insert && !config.dry_run {
            sinks.push(Box::new(SqliteSink::open(
                &config.database_path,
                config.chunk_size,
            )?));
        }

        Ok(Self::with_sinks(config, sinks))
    }

    /// Create a processor with an explicit set of sinks
    pub fn with_sinks(config: CleanerConfig, sinks: Vec<Box<dyn RecordSink>>) -> Self {
        Self {
            file_discovery: FileDiscovery::new(config.input_path.clone()),
            archiver: SourceArchiver::new(config.input_path.clone()),
            config,
            sinks,
        }
    }

    /// Names of the active sinks, in delivery order
    pub fn sink_names(&self) -> Vec<&str> {
        self.sinks.iter().map(|s| s.name()).collect()
    }

    /// Main processing entry point
    pub async fn process(&mut self) -> Result<ProcessingStats> {
        let start_time = Instant::now();
        let started = Local::now();

        println!("{}", "Starting account log cleaning".bright_green().bold());
        println!(
            "  {} {}",
            "Input:".bright_cyan(),
            self.config.input_path.display()
        );
        if self.config.dry_run {
            println!("  {}", "DRY RUN - database writes disabled".bright_yellow().bold());
        }

        // Step 1: Discover log files
        println!("\n{}", "Discovering log files...".bright_yellow());
        let files = self.file_discovery.discover_log_files().await?;
        println!(
            "  {} {} log files",
            "Found".bright_green(),
            files.len().to_string().bright_white().bold()
        );

        let mut stats = ProcessingStats::default();
        if files.is_empty() {
            warn!("No log files found in {}", self.config.input_path.display());
            stats.processing_time_ms = start_time.elapsed().as_millis();
            print_summary(&stats);
            return Ok(stats);
        }

        // Step 2: Clean files concurrently, deliver sequentially
        println!("\n{}", "Processing files...".bright_yellow());
        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb.set_message("Processing files");

        let mut succeeded = Vec::new();
        let total_batches = files.len().div_ceil(self.config.batch_size);

        for (batch_num, chunk) in files.chunks(self.config.batch_size).enumerate() {
            debug!(
                "Processing batch {}/{} ({} files)",
                batch_num + 1,
                total_batches,
                chunk.len()
            );

            let mut results = stream::iter(chunk)
                .map(|path| {
                    let path = path.clone();
                    let pb = pb.clone();
                    async move {
                        if let Some(file_name) = path.file_name() {
                            pb.set_message(format!("Processing: {}", file_name.to_string_lossy()));
                        }
                        let result = run_pipeline(path.clone()).await;
                        pb.inc(1);
                        (path, result)
                    }
                })
                .buffer_unordered(self.config.max_workers)
                .collect::<Vec<_>>()
                .await;

            // Deliver in file-name order regardless of completion order
            results.sort_by(|a, b| a.0.cmp(&b.0));

            for (path, result) in results {
                let outcome = match result {
                    Ok(file) => self.deliver_file(&file).map(|records| (file, records)),
                    Err(e) => Err(e),
                };

                match outcome {
                    Ok((file, records)) => {
                        debug!("Successfully processed: {}", path.display());
                        stats.files_processed += 1;
                        stats.total_records += records;
                        stats.reports.push(FileReport {
                            file_name: file.file_name,
                            schema: Some(file.schema),
                            status: FileStatus::Succeeded { records },
                            parse: Some(file.report),
                        });
                        succeeded.push(path);
                    }
                    Err(e) if e.is_file_scoped() => {
                        error!("Failed to process {}: {}", path.display(), e);
                        stats.files_failed += 1;
                        stats.reports.push(failure_report(&path, &e));
                    }
                    Err(e) => {
                        pb.finish_and_clear();
                        return Err(e);
                    }
                }
            }
        }
        pb.finish_with_message("Processing complete");

        // Step 3: Relocate processed sources
        if self.config.archive_sources {
            if self.config.dry_run {
                info!(
                    "[DRY RUN] Would archive {} files into {}",
                    succeeded.len(),
                    self.archiver.folder_for(started).display()
                );
            } else {
                let outcome = self.archiver.archive(&succeeded, started).await?;
                stats.files_archived = outcome.moved.len();
                if !outcome.moved.is_empty() {
                    info!(
                        "Archived {} files into {}",
                        outcome.moved.len(),
                        outcome.folder.display()
                    );
                }
            }
        }

        stats.processing_time_ms = start_time.elapsed().as_millis();
        print_summary(&stats);
        Ok(stats)
    }

    /// Hand one processed file to every sink, returning its record count
    fn deliver_file(&mut self, file: &ProcessedFile) -> Result<usize> {
        let records = file.record_count();
        if records == 0 {
            warn!("No records in {}, skipping sinks", file.file_name);
            return Ok(0);
        }

        for index in 0..self.sinks.len() {
            match deliver(self.sinks[index].as_mut(), file) {
                Ok(written) => debug!(
                    "{} wrote {} rows for {}",
                    self.sinks[index].name(),
                    written,
                    file.file_name
                ),
                Err(e) => {
                    for earlier in self.sinks[..index].iter_mut() {
                        if let Err(discard_error) = earlier.discard(file) {
                            warn!(
                                "{} could not discard {}: {}",
                                earlier.name(),
                                file.file_name,
                                discard_error
                            );
                        }
                    }
                    return Err(e);
                }
            }
        }

        if self.config.dry_run && self.config.enable_db_insert {
            info!(
                "[DRY RUN] Would insert {} records into {}",
                records, file.schema
            );
        }

        Ok(records)
    }
}

/// Run the pipeline for one file on the blocking pool
async fn run_pipeline(path: PathBuf) -> Result<ProcessedFile> {
    let processed_at = processing_timestamp();
    let task_path = path.clone();

    task::spawn_blocking(move || FilePipeline::run(&task_path, &processed_at))
        .await
        .unwrap_or_else(|e| {
            Err(CleanerError::ParseFailure {
                path,
                reason: format!("processing task failed: {}", e),
            })
        })
}

fn failure_report(path: &Path, error: &CleanerError) -> FileReport {
    FileReport {
        file_name: path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default(),
        schema: classify_path(path).ok(),
        status: FileStatus::Failed {
            reason: error.to_string(),
        },
        parse: None,
    }
}

fn print_summary(stats: &ProcessingStats) {
    println!("\n{}", "Processing Summary".bright_green().bold());
    println!(
        "  {} {}ms",
        "Time elapsed:".bright_cyan(),
        stats.processing_time_ms.to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Files processed:".bright_cyan(),
        stats.files_processed.to_string().bright_white()
    );
    if stats.files_failed > 0 {
        println!(
            "  {} {}",
            "Files failed:".bright_red(),
            stats.files_failed.to_string().bright_red().bold()
        );
        for report in stats.failed_files() {
            if let FileStatus::Failed { reason } = &report.status {
                println!("    {} {}", report.file_name.bright_red(), reason);
            }
        }
    }
    println!(
        "  {} {}",
        "Total records:".bright_cyan(),
        stats.total_records.to_string().bright_white().bold()
    );
    if stats.files_archived > 0 {
        println!(
            "  {} {}",
            "Files archived:".bright_cyan(),
            stats.files_archived.to_string().bright_white()
        );
    }
}
