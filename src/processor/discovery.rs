//! File discovery for the input directory
//!
//! Lists the regular files directly inside the input directory whose names
//! start with the validation log pattern. Subdirectories, including earlier
//! archive folders, are never descended into.

use crate::error::{CleanerError, Result};
use crate::schema::is_candidate;
use std::path::PathBuf;
use tokio::fs;
use tracing::debug;

/// File discovery component for the input directory
#[derive(Debug)]
pub struct FileDiscovery {
    input_path: PathBuf,
    skipped: usize,
}

impl FileDiscovery {
    /// Create a new file discovery instance
    pub fn new(input_path: PathBuf) -> Self {
        Self {
            input_path,
            skipped: 0,
        }
    }

    /// Number of regular files ignored by the last scan
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Discover candidate log files, sorted by name
    pub async fn discover_log_files(&mut self) -> Result<Vec<PathBuf>> {
        if !fs::try_exists(&self.input_path).await.unwrap_or(false) {
            return Err(CleanerError::InputNotFound {
                path: self.input_path.clone(),
            });
        }

        debug!("Searching for log files in: {}", self.input_path.display());

        let mut files = Vec::new();
        let mut skipped = 0;
        let mut dir = fs::read_dir(&self.input_path).await?;

        while let Some(entry) = dir.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }

            let name = entry.file_name();
            if is_candidate(&name.to_string_lossy()) {
                files.push(entry.path());
            } else {
                debug!("Ignoring file: {}", name.to_string_lossy());
                skipped += 1;
            }
        }

        files.sort();
        self.skipped = skipped;
        debug!("Found {} log files ({} ignored)", files.len(), skipped);

        Ok(files)
    }
}
