//! Tolerant tab-delimited parsing for validation log files
//!
//! Parsing happens in two passes over the same decoded text:
//!
//! - [`tab_parser`] tokenizes every physical line on tabs, skipping lines
//!   that cannot be tokenized and dropping columns that are empty in every
//!   row of the file.
//! - [`recovery`] rescans the raw text of `ValidationError` files for lines
//!   whose status payload carries JSON braces and reassembles payloads that
//!   were split across extra tab fragments.
//!
//! Every line ends up counted in a [`ParseReport`] so skipped and salvaged
//! lines stay visible in the batch summary.
//!
//! ## Usage
//!
//! ```rust
//! use account_log_cleaner::models::RecordSchema;
//! use account_log_cleaner::parser::{LineRecoveryEngine, ParseReport, TabRecordParser};
//!
//! let content = "Bank: Melli\tAcc: 1\tSheba: IR1\tNC: 2\tTT: 2023-01-10T10:00:00\tEC: 7\tSt: {\"a\":1}\n";
//! let mut report = ParseReport::default();
//! let mut records = TabRecordParser::new(RecordSchema::ValidationError).parse(content, &mut report);
//! records.extend(LineRecoveryEngine::new(RecordSchema::ValidationError).recover(content, &mut report));
//!
//! assert_eq!(records.len(), 1);
//! assert_eq!(report.recovered, 1);
//! ```

pub mod recovery;
pub mod stats;
pub mod tab_parser;

pub use recovery::{LineRecoveryEngine, RecoveryOutcome, recover_line};
pub use stats::ParseReport;
pub use tab_parser::{LineOutcome, SkipReason, TabRecordParser, drop_empty_columns};

/// Split decoded file text into physical lines.
///
/// Only `\n` terminates a line; a preceding `\r` stays on the line so that
/// callers can see source-encoding artifacts such as a tab right before the
/// carriage return. A trailing terminator does not produce an extra line.
pub fn physical_lines(content: &str) -> impl Iterator<Item = &str> {
    let content = content.strip_suffix('\n').unwrap_or(content);
    (!content.is_empty())
        .then(|| content.split('\n'))
        .into_iter()
        .flatten()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_physical_lines_keep_carriage_returns() {
        let lines: Vec<&str> = physical_lines("a\tb\t\r\nc\n").collect();
        assert_eq!(lines, vec!["a\tb\t\r", "c"]);
    }

    #[test]
    fn test_physical_lines_empty_content() {
        assert_eq!(physical_lines("").count(), 0);
        assert_eq!(physical_lines("\n").count(), 0);
        assert_eq!(physical_lines("\n\n").count(), 2);
    }
}
