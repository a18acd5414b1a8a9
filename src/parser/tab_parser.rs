//! Primary tab-delimited parser
//!
//! Tokenizes each physical line on tab characters. Lines are only skipped
//! when they cannot be tokenized at all or, for `ValidationError` files,
//! when the recovery pass will rebuild them from their JSON marker; a field
//! count that differs from the rest of the file is not a reason to skip.

use super::physical_lines;
use super::recovery::{JSON_MARKER, RecoveryOutcome, recover_line};
use super::stats::ParseReport;
use crate::models::{RawRecord, RecordSchema};
use tracing::debug;

/// Why a line produced no record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Empty or whitespace only
    Blank,
    /// Contains control characters other than tab (binary garbage)
    Untokenizable,
    /// Carries a JSON marker the recovery pass can rebuild
    RecoveryCandidate,
}

/// Result of tokenizing one physical line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    Parsed(RawRecord),
    Skipped(SkipReason),
}

/// Tokenize a single physical line
pub fn parse_line(raw: &str, schema: RecordSchema) -> LineOutcome {
    let line = raw.strip_suffix('\r').unwrap_or(raw);

    if line.trim().is_empty() {
        return LineOutcome::Skipped(SkipReason::Blank);
    }

    if line.chars().any(|c| c != '\t' && c.is_control()) || line.contains('\u{FFFD}') {
        return LineOutcome::Skipped(SkipReason::Untokenizable);
    }

    // Marker lines recovery cannot rebuild stay with this pass
    if schema == RecordSchema::ValidationError
        && line.contains(JSON_MARKER)
        && matches!(recover_line(raw, schema), RecoveryOutcome::Recovered(_))
    {
        return LineOutcome::Skipped(SkipReason::RecoveryCandidate);
    }

    LineOutcome::Parsed(line.split('\t').collect())
}

/// Drop columns that are empty in every record.
///
/// Records may have different arities; a missing position counts as empty.
/// Returns the number of columns removed.
pub fn drop_empty_columns(records: &mut [RawRecord]) -> usize {
    let width = records.iter().map(RawRecord::arity).max().unwrap_or(0);
    if width == 0 {
        return 0;
    }

    let keep: Vec<bool> = (0..width)
        .map(|index| {
            records
                .iter()
                .any(|r| r.fields.get(index).is_some_and(|v| !v.is_empty()))
        })
        .collect();

    let dropped = keep.iter().filter(|k| !**k).count();
    if dropped == 0 {
        return 0;
    }

    for record in records.iter_mut() {
        let fields = std::mem::take(&mut record.fields);
        record.fields = fields
            .into_iter()
            .zip(keep.iter())
            .filter_map(|(value, keep)| keep.then_some(value))
            .collect();
    }

    dropped
}

/// Tolerant tab-delimited parser for one schema
#[derive(Debug, Clone, Copy)]
pub struct TabRecordParser {
    schema: RecordSchema,
}

impl TabRecordParser {
    pub fn new(schema: RecordSchema) -> Self {
        Self { schema }
    }

    /// Parse decoded file text into raw records.
    ///
    /// Never fails: a file without any parseable line yields an empty vector.
    pub fn parse(&self, content: &str, report: &mut ParseReport) -> Vec<RawRecord> {
        let mut records = Vec::new();

        for (line_num, line) in physical_lines(content).enumerate() {
            report.total_lines += 1;

            match parse_line(line, self.schema) {
                LineOutcome::Parsed(record) => {
                    report.parsed += 1;
                    records.push(record);
                }
                LineOutcome::Skipped(SkipReason::Blank) => report.skipped_blank += 1,
                LineOutcome::Skipped(SkipReason::Untokenizable) => {
                    report.skipped_untokenizable += 1;
                    debug!("Skipped untokenizable line {}", line_num + 1);
                }
                LineOutcome::Skipped(SkipReason::RecoveryCandidate) => {
                    report.deferred_to_recovery += 1;
                }
            }
        }

        report.dropped_columns = drop_empty_columns(&mut records);
        if report.dropped_columns > 0 {
            debug!("Dropped {} all-empty columns", report.dropped_columns);
        }

        records
    }
}
