//! Per-file parsing statistics
//!
//! Tracks what happened to every physical line of a file across the
//! tolerant parser, the recovery pass and the normalizer's row drop.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseReport {
    /// Physical lines in the file
    pub total_lines: usize,

    /// Lines tokenized by the primary parser
    pub parsed: usize,

    /// Whitespace-only lines
    pub skipped_blank: usize,

    /// Lines carrying control characters that cannot be tab-tokenized
    pub skipped_untokenizable: usize,

    /// Marker-bearing lines left to the recovery pass
    pub deferred_to_recovery: usize,

    /// Lines examined by the recovery pass
    pub recovery_candidates: usize,

    /// Lines reconstructed by the recovery pass
    pub recovered: usize,

    /// Candidates whose field count could not be reconciled
    pub recovery_discarded: usize,

    /// Columns empty in every parsed row
    pub dropped_columns: usize,

    /// Rows removed because every field was empty after prefix stripping
    pub dropped_empty_rows: usize,

    /// Recovery ran and salvaged nothing
    pub recovery_degraded: bool,
}

impl ParseReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines that produced no record in the primary pass
    pub fn skipped(&self) -> usize {
        self.skipped_blank + self.skipped_untokenizable + self.deferred_to_recovery
    }

    /// Raw records handed to schema mapping
    pub fn raw_records(&self) -> usize {
        self.parsed + self.recovered
    }
}

impl fmt::Display for ParseReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} lines: {} parsed, {} recovered, {} skipped ({} blank, {} untokenizable), {} unrecoverable, {} empty rows dropped",
            self.total_lines,
            self.parsed,
            self.recovered,
            self.skipped_blank + self.skipped_untokenizable,
            self.skipped_blank,
            self.skipped_untokenizable,
            self.recovery_discarded,
            self.dropped_empty_rows
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals() {
        let report = ParseReport {
            total_lines: 10,
            parsed: 6,
            skipped_blank: 1,
            skipped_untokenizable: 1,
            deferred_to_recovery: 2,
            recovery_candidates: 2,
            recovered: 1,
            recovery_discarded: 1,
            ..Default::default()
        };

        assert_eq!(report.skipped(), 4);
        assert_eq!(report.raw_records(), 7);
        assert!(report.to_string().starts_with("10 lines: 6 parsed, 1 recovered"));
    }
}
