//! Archival parquet sink
//!
//! Writes each processed file to its own parquet file named after the record
//! type, the processing instant and the source file, so repeated runs never
//! overwrite earlier archives. All columns are stored as strings in
//! canonical order.

use crate::config::CompressionAlgorithm;
use crate::error::{CleanerError, Result};
use crate::models::ProcessedFile;
use crate::processor::sink::RecordSink;

use polars::prelude::{Column, DataFrame, ParquetWriter as PolarsParquetWriter};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Build a string-typed frame holding the canonical columns of `file`
pub fn to_dataframe(file: &ProcessedFile) -> Result<DataFrame> {
    let columns: Vec<Column> = file
        .schema
        .canonical_fields()
        .iter()
        .map(|field| Column::new(field.name().into(), file.column(*field)))
        .collect();

    Ok(DataFrame::new(columns)?)
}

/// Parquet sink for archival copies of cleaned records
#[derive(Debug)]
pub struct ParquetSink {
    output_dir: PathBuf,
    compression: CompressionAlgorithm,
}

impl ParquetSink {
    pub fn new(output_dir: impl Into<PathBuf>, compression: CompressionAlgorithm) -> Self {
        Self {
            output_dir: output_dir.into(),
            compression,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// `<Type>_<processed_at>_<source stem>.parquet`, without colons
    pub fn output_path(&self, file: &ProcessedFile) -> PathBuf {
        let stamp = file.processed_at.replace(':', "");
        let stem = Path::new(&file.file_name)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        self.output_dir
            .join(format!("{}_{}_{}.parquet", file.schema, stamp, stem))
    }
}

impl RecordSink for ParquetSink {
    fn name(&self) -> &str {
        "parquet"
    }

    fn write(&mut self, file: &ProcessedFile) -> Result<usize> {
        std::fs::create_dir_all(&self.output_dir)?;

        let mut df = to_dataframe(file)?;
        let path = self.output_path(file);
        let partial = partial_path(&path);

        // Only a completely written file is ever visible under its final name
        let written = std::fs::File::create(&partial)
            .map_err(CleanerError::from)
            .and_then(|out| {
                PolarsParquetWriter::new(out)
                    .with_compression(self.compression.to_polars_compression())
                    .finish(&mut df)
                    .map_err(|e| {
                        CleanerError::sink(self.name(), format!("{}: {}", path.display(), e))
                    })
            })
            .and_then(|_| std::fs::rename(&partial, &path).map_err(CleanerError::from));

        if let Err(e) = written {
            let _ = std::fs::remove_file(&partial);
            return Err(e);
        }

        debug!("Wrote {} rows to {}", df.height(), path.display());
        Ok(df.height())
    }

    fn discard(&mut self, file: &ProcessedFile) -> Result<()> {
        let path = self.output_path(file);
        match std::fs::remove_file(&path) {
            Ok(()) => {
                debug!("Removed {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Sibling path a parquet file is written to before being renamed into place
fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".partial");
    path.with_file_name(name)
}
