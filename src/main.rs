use account_log_cleaner::cli::Args;
use account_log_cleaner::processor::BatchProcessor;
use anyhow::Context;
use clap::Parser;
use std::fs::OpenOptions;
use std::path::Path;
use std::process;
use std::sync::Mutex;

fn main() {
    // Parse command line arguments (falling back to the environment)
    let args = Args::parse();

    let config = args.into_config().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(2);
    });

    if let Err(e) = setup_logging(&config.log_level, config.log_file.as_deref()) {
        eprintln!("Failed to initialise logging: {:#}", e);
        process::exit(1);
    }

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        let mut processor = BatchProcessor::new(config)?;
        processor.process().await
    });

    match result {
        Ok(stats) => {
            // Per-file failures have already been reported in the summary
            if stats.files_failed > 0 {
                process::exit(1);
            }
            process::exit(0);
        }
        Err(error) => {
            tracing::error!("Run aborted: {}", error);
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Structured logging to stderr and, optionally, a log file
fn setup_logging(log_level: &str, log_file: Option<&Path>) -> anyhow::Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("account_log_cleaner={}", log_level)));

    let file_layer = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create log directory {}", parent.display())
                })?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();

    Ok(())
}
