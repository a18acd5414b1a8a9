//! Salvage pass for `ValidationError` lines carrying JSON status payloads
//!
//! The status field of error records sometimes holds a JSON-like payload
//! with literal tabs inside it, so the line tokenizes into more fields than
//! the schema declares. This pass rescans the raw text, picks the lines
//! containing a `{` marker and reassembles the payload fragments.
//!
//! Known limitation: only the field count is checked. A marker in an earlier
//! field, or a payload with a different number of embedded tabs that happens
//! to produce one of the accepted counts, is reassembled without complaint.

use super::physical_lines;
use super::stats::ParseReport;
use crate::models::{RawRecord, RecordSchema};
use tracing::debug;

/// Character whose presence marks a line as carrying a JSON payload
pub const JSON_MARKER: char = '{';

/// Source-encoding artifact removed before splitting
const TAB_CARRIAGE_RETURN: &str = "\t\r";

/// Number of fragments a split status payload occupies
const PAYLOAD_FRAGMENTS: usize = 4;

/// Result of trying to reconstruct one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryOutcome {
    Recovered(RawRecord),
    Unrecoverable { arity: usize },
}

/// Reconstruct a marker-bearing line into a record of the schema's arity.
///
/// A line that splits into exactly the expected arity is accepted unchanged.
/// One that splits into three extra fields has its last four fragments
/// concatenated, without separator, into the status field. Anything else is
/// unrecoverable. Only `ValidationError` lines are ever reconstructed.
pub fn recover_line(line: &str, schema: RecordSchema) -> RecoveryOutcome {
    let cleaned = line.replace(TAB_CARRIAGE_RETURN, "");
    let cleaned = cleaned.trim_end_matches(['\r', '\n']);
    let fragments: Vec<&str> = cleaned.split('\t').collect();
    let arity = fragments.len();

    if schema != RecordSchema::ValidationError {
        return RecoveryOutcome::Unrecoverable { arity };
    }

    let expected = schema.expected_arity();
    let payload_start = expected - 1;

    if arity == expected {
        RecoveryOutcome::Recovered(fragments.into_iter().collect())
    } else if arity == payload_start + PAYLOAD_FRAGMENTS {
        let payload = fragments[payload_start..].concat();
        let record = fragments[..payload_start]
            .iter()
            .map(|f| f.to_string())
            .chain(std::iter::once(payload))
            .collect();
        RecoveryOutcome::Recovered(record)
    } else {
        RecoveryOutcome::Unrecoverable { arity }
    }
}

/// Second-pass line recovery for one schema
#[derive(Debug, Clone, Copy)]
pub struct LineRecoveryEngine {
    schema: RecordSchema,
}

impl LineRecoveryEngine {
    pub fn new(schema: RecordSchema) -> Self {
        Self { schema }
    }

    /// Recover marker-bearing lines from the raw file text.
    ///
    /// Never fails; returns the salvaged records to be appended to the
    /// primary parser's output.
    pub fn recover(&self, content: &str, report: &mut ParseReport) -> Vec<RawRecord> {
        let mut recovered = Vec::new();

        for (line_num, line) in physical_lines(content).enumerate() {
            if !line.contains(JSON_MARKER) {
                continue;
            }
            report.recovery_candidates += 1;

            match recover_line(line, self.schema) {
                RecoveryOutcome::Recovered(record) => recovered.push(record),
                RecoveryOutcome::Unrecoverable { arity } => {
                    report.recovery_discarded += 1;
                    debug!(
                        "Discarded line {}: {} fields cannot be reconciled to {}",
                        line_num + 1,
                        arity,
                        self.schema.expected_arity()
                    );
                }
            }
        }

        report.recovered = recovered.len();
        report.recovery_degraded = recovered.is_empty();

        if recovered.is_empty() && report.recovery_candidates > 0 {
            debug!(
                "Recovery salvaged none of {} marker-bearing lines",
                report.recovery_candidates
            );
        } else if !recovered.is_empty() {
            debug!("Recovered {} additional lines", recovered.len());
        }

        recovered
    }
}
