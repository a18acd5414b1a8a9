//! Single-file cleaning pipeline
//!
//! Runs one source file through every cleaning stage in order:
//! classification, tolerant parsing, line recovery, schema mapping,
//! normalization, enrichment and size enforcement. The result is a
//! [`ProcessedFile`] ready for the sinks. Everything here is synchronous;
//! the batch orchestrator moves it onto the blocking pool.

use crate::error::{CleanerError, Result};
use crate::models::{ProcessedFile, RecordSchema};
use crate::parser::{LineRecoveryEngine, ParseReport, TabRecordParser};
use crate::schema::{classify, map_records};
use crate::transform::{Enricher, Normalizer, SizeConstraintEnforcer};

use std::path::Path;
use tracing::{debug, warn};

const UTF8_BOM: char = '\u{feff}';

/// Decode file bytes as UTF-8, dropping a leading byte-order mark
pub fn decode(path: &Path, bytes: Vec<u8>) -> Result<String> {
    let text = String::from_utf8(bytes).map_err(|e| CleanerError::ParseFailure {
        path: path.to_path_buf(),
        reason: format!("content is not valid UTF-8: {}", e.utf8_error()),
    })?;

    Ok(match text.strip_prefix(UTF8_BOM) {
        Some(stripped) => stripped.to_string(),
        None => text,
    })
}

/// Stateless driver for the per-file stages
#[derive(Debug, Clone, Copy, Default)]
pub struct FilePipeline;

impl FilePipeline {
    /// Read and clean the file at `path`.
    ///
    /// Read errors are reported as [`CleanerError::ParseFailure`] so that a
    /// vanished or unreadable file only fails itself.
    pub fn run(path: &Path, processed_at: &str) -> Result<ProcessedFile> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        // Classify before reading so unrelated files are rejected cheaply
        let schema = classify(&file_name)?;

        let bytes = std::fs::read(path).map_err(|e| CleanerError::ParseFailure {
            path: path.to_path_buf(),
            reason: format!("failed to read file: {}", e),
        })?;
        let content = decode(path, bytes)?;

        Self::run_content(path, &file_name, schema, &content, processed_at)
    }

    /// Clean already decoded file text
    pub fn run_content(
        path: &Path,
        file_name: &str,
        schema: RecordSchema,
        content: &str,
        processed_at: &str,
    ) -> Result<ProcessedFile> {
        let mut report = ParseReport::new();

        let mut raw = TabRecordParser::new(schema).parse(content, &mut report);
        if schema == RecordSchema::ValidationError {
            let recovered = LineRecoveryEngine::new(schema).recover(content, &mut report);
            if report.recovery_degraded && report.recovery_candidates > 0 {
                let degraded = CleanerError::RecoveryDegraded {
                    path: path.to_path_buf(),
                };
                warn!("{}", degraded);
            }
            raw.extend(recovered);
        }

        if raw.is_empty() {
            warn!("No parseable lines in {}", file_name);
        }

        let mapped = map_records(&raw, schema);
        let (mut records, dropped) = Normalizer::new(schema).normalize(mapped)?;
        report.dropped_empty_rows = dropped;

        Enricher::new(schema, file_name, processed_at).enrich(&mut records)?;

        let truncated = SizeConstraintEnforcer::new(schema).enforce(&mut records);
        if truncated > 0 {
            debug!("Truncated {} values in {}", truncated, file_name);
        }

        debug!("{}: {}", file_name, report);

        Ok(ProcessedFile {
            path: path.to_path_buf(),
            file_name: file_name.to_string(),
            schema,
            processed_at: processed_at.to_string(),
            records,
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Field;
    use std::fs;
    use tempfile::TempDir;

    const STAMP: &str = "2024-05-01T08:30:00.000001";

    #[test]
    fn test_decode_strips_bom() {
        let path = Path::new("ValidationOk.txt");
        let text = decode(path, "\u{feff}Bank: Melli".as_bytes().to_vec()).unwrap();
        assert_eq!(text, "Bank: Melli");
    }

    #[test]
    fn test_invalid_utf8_is_a_parse_failure() {
        let path = Path::new("ValidationOk.txt");
        let result = decode(path, vec![b'a', 0xff, 0xfe, b'b']);
        assert!(matches!(result, Err(CleanerError::ParseFailure { .. })));
    }

    #[test]
    fn test_validation_ok_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ValidationOk1.txt");
        fs::write(
            &path,
            "Bank: Melli\tAcc: 123\tSheba: IR12\tNC: 0012345678\tTT: 2023-01-10T10:00:00\tSt: OK\n",
        )
        .unwrap();

        let processed = FilePipeline::run(&path, STAMP).unwrap();

        assert_eq!(processed.schema, RecordSchema::ValidationOk);
        assert_eq!(processed.record_count(), 1);
        let record = &processed.records[0];
        assert_eq!(record.get(Field::BankName), Some("Melli"));
        assert_eq!(record.get(Field::Date), Some("2023-01-10"));
        assert_eq!(record.get(Field::FileName), Some("ValidationOk1.txt"));
        assert_eq!(record.get(Field::Type), Some("ValidationOk"));
        assert_eq!(record.get(Field::ProcessedAt), Some(STAMP));
    }

    #[test]
    fn test_unrecognized_name_is_rejected_before_reading() {
        let result = FilePipeline::run(Path::new("/does/not/exist/notes.txt"), STAMP);
        assert!(matches!(
            result,
            Err(CleanerError::UnrecognizedFileType { .. })
        ));
    }

    #[test]
    fn test_missing_file_is_a_parse_failure() {
        let result = FilePipeline::run(Path::new("/does/not/exist/ValidationOk.txt"), STAMP);
        assert!(matches!(result, Err(CleanerError::ParseFailure { .. })));
    }

    #[test]
    fn test_empty_content_yields_no_records() {
        let processed = FilePipeline::run_content(
            Path::new("ValidationError.txt"),
            "ValidationError.txt",
            RecordSchema::ValidationError,
            "",
            STAMP,
        )
        .unwrap();

        assert_eq!(processed.record_count(), 0);
        assert!(processed.report.recovery_degraded);
        assert_eq!(processed.report.recovery_candidates, 0);
    }
}
