//! Source file relocation
//!
//! After a run, successfully processed source files are moved into a
//! subdirectory of the input directory named after the run's start time
//! (`YYYY-mm-dd_HHMMSS`). Discovery ignores subdirectories, so archived
//! files are never picked up again.

use crate::error::{CleanerError, Result};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// Folder name for a run started at `started`
pub fn archive_folder_name(started: DateTime<Local>) -> String {
    started.format("%Y-%m-%d_%H%M%S").to_string()
}

/// Result of relocating a batch of source files
#[derive(Debug, Clone, Default)]
pub struct ArchiveOutcome {
    pub folder: PathBuf,
    pub moved: Vec<PathBuf>,
    pub failed: Vec<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct SourceArchiver {
    input_path: PathBuf,
}

impl SourceArchiver {
    pub fn new(input_path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
        }
    }

    pub fn folder_for(&self, started: DateTime<Local>) -> PathBuf {
        self.input_path.join(archive_folder_name(started))
    }

    /// Move `files` into the run's archive folder.
    ///
    /// Failing to create the folder aborts the whole step; a file that
    /// cannot be moved is reported and left in place.
    pub async fn archive(&self, files: &[PathBuf], started: DateTime<Local>) -> Result<ArchiveOutcome> {
        let folder = self.folder_for(started);
        let mut outcome = ArchiveOutcome {
            folder: folder.clone(),
            ..Default::default()
        };

        if files.is_empty() {
            return Ok(outcome);
        }

        fs::create_dir_all(&folder)
            .await
            .map_err(|e| CleanerError::Archive {
                path: folder.clone(),
                reason: e.to_string(),
            })?;

        for file in files {
            match Self::move_into(file, &folder).await {
                Ok(target) => {
                    debug!("Archived {} -> {}", file.display(), target.display());
                    outcome.moved.push(target);
                }
                Err(e) => {
                    warn!("{}", e);
                    outcome.failed.push(file.clone());
                }
            }
        }

        Ok(outcome)
    }

    async fn move_into(file: &Path, folder: &Path) -> Result<PathBuf> {
        let name = file.file_name().ok_or_else(|| CleanerError::Archive {
            path: file.to_path_buf(),
            reason: "path has no file name".to_string(),
        })?;
        let target = folder.join(name);

        fs::rename(file, &target)
            .await
            .map_err(|e| CleanerError::Archive {
                path: file.to_path_buf(),
                reason: e.to_string(),
            })?;
        Ok(target)
    }
}
