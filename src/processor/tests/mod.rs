//! Integration tests for the processor module
//!
//! Exercise complete runs against temporary input directories.


use crate::config::CleanerConfig;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub const SCENARIO_A_LINE: &str =
    "Bank: Melli\tAcc: 123\tSheba: IR12\tNC: 0012345678\tTT: 2023-01-10T10:00:00\tSt: OK";

/// Temporary input, parquet and database locations for one run
pub struct TestWorkspace {
    pub temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("input")).unwrap();
        Self { temp_dir }
    }

    pub fn input(&self) -> PathBuf {
        self.temp_dir.path().join("input")
    }

    pub fn parquet(&self) -> PathBuf {
        self.temp_dir.path().join("parquet")
    }

    pub fn database(&self) -> PathBuf {
        self.temp_dir.path().join("db").join("logs.db")
    }

    pub fn write_input(&self, name: &str, content: &str) -> PathBuf {
        let path = self.input().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    pub fn config(&self) -> CleanerConfig {
        CleanerConfig::default()
            .with_input_path(self.input())
            .with_parquet_path(self.parquet())
            .with_database_path(self.database())
            .with_chunk_size(2)
    }

    pub fn parquet_files(&self) -> Vec<PathBuf> {
        match fs::read_dir(self.parquet()) {
            Ok(entries) => {
                let mut files: Vec<PathBuf> = entries.map(|e| e.unwrap().path()).collect();
                files.sort();
                files
            }
            Err(_) => Vec::new(),
        }
    }

    /// Archive folders created inside the input directory
    pub fn archive_folders(&self) -> Vec<PathBuf> {
        fs::read_dir(self.input())
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| p.is_dir())
            .collect()
    }
}
