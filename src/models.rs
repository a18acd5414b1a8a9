//! Core data structures and types for account log processing.
//!
//! Defines the two record schemas, the canonical field identifiers,
//! raw and normalized record representations, and the per-file and
//! per-run statistics reported by the orchestrator.

use crate::parser::ParseReport;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Record layout of a validation log file, inferred from its file name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordSchema {
    ValidationOk,
    ValidationError,
}

impl RecordSchema {
    /// Tag used in file names, the `Type` column and as the table name
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordSchema::ValidationOk => "ValidationOk",
            RecordSchema::ValidationError => "ValidationError",
        }
    }

    /// Number of positional fields a well-formed source line carries
    pub fn expected_arity(&self) -> usize {
        self.raw_fields().len()
    }

    /// Positional field order of the source file
    pub fn raw_fields(&self) -> &'static [Field] {
        crate::schema::raw_field_order(*self)
    }

    /// Output field order after enrichment
    pub fn canonical_fields(&self) -> &'static [Field] {
        crate::schema::canonical_field_order(*self)
    }
}

impl fmt::Display for RecordSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical field identifiers.
///
/// Declaration order is the canonical output order, so ordered maps keyed by
/// `Field` iterate in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Field {
    BankName,
    AccountNumber,
    ShebaNumber,
    NationalCode,
    Date,
    TransactionTime,
    ErrorCode,
    Status,
    FileName,
    Type,
    ProcessedAt,
}

impl Field {
    pub fn name(&self) -> &'static str {
        match self {
            Field::BankName => "BankName",
            Field::AccountNumber => "AccountNumber",
            Field::ShebaNumber => "ShebaNumber",
            Field::NationalCode => "NationalCode",
            Field::Date => "Date",
            Field::TransactionTime => "TransactionTime",
            Field::ErrorCode => "ErrorCode",
            Field::Status => "Status",
            Field::FileName => "FileName",
            Field::Type => "Type",
            Field::ProcessedAt => "ProcessedAt",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Untyped positional fields produced by splitting one source line on tabs
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawRecord {
    pub fields: Vec<String>,
}

impl RawRecord {
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    pub fn arity(&self) -> usize {
        self.fields.len()
    }
}

impl<S: Into<String>> FromIterator<S> for RawRecord {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Record keyed by canonical field name
///
/// Values are `None` only between schema mapping and normalization; after
/// the normalizer runs every field of the schema holds a string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NormalizedRecord {
    values: BTreeMap<Field, Option<String>>,
}

impl NormalizedRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.values.insert(field, Some(value.into()));
    }

    /// Mark a field as present but without a value
    pub fn set_absent(&mut self, field: Field) {
        self.values.insert(field, None);
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.values.get(&field).and_then(|v| v.as_deref())
    }

    pub fn contains(&self, field: Field) -> bool {
        self.values.contains_key(&field)
    }

    pub fn remove(&mut self, field: Field) -> Option<String> {
        self.values.remove(&field).flatten()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Fields in canonical order
    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.values.keys().copied()
    }

    pub(crate) fn values_mut(&mut self) -> impl Iterator<Item = (&Field, &mut Option<String>)> {
        self.values.iter_mut()
    }

    pub(crate) fn all_absent(&self) -> bool {
        self.values
            .values()
            .all(|v| v.as_deref().is_none_or(str::is_empty))
    }
}

/// Output of one file's pipeline run, handed to the sinks
#[derive(Debug, Clone)]
pub struct ProcessedFile {
    pub path: PathBuf,
    pub file_name: String,
    pub schema: RecordSchema,
    /// ISO-8601 instant shared by every record of this run
    pub processed_at: String,
    pub records: Vec<NormalizedRecord>,
    pub report: ParseReport,
}

impl ProcessedFile {
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Values of one column in record order, empty for missing fields
    pub fn column(&self, field: Field) -> Vec<String> {
        self.records
            .iter()
            .map(|r| r.get(field).unwrap_or_default().to_string())
            .collect()
    }
}

/// Outcome of processing a single file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum FileStatus {
    Succeeded { records: usize },
    Failed { reason: String },
}

/// Per-file line of the batch report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    pub file_name: String,
    pub schema: Option<RecordSchema>,
    pub status: FileStatus,
    pub parse: Option<ParseReport>,
}

impl FileReport {
    pub fn is_success(&self) -> bool {
        matches!(self.status, FileStatus::Succeeded { .. })
    }
}

/// Processing statistics for a whole run
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub files_processed: usize,
    pub files_failed: usize,
    pub total_records: usize,
    pub files_archived: usize,
    pub reports: Vec<FileReport>,
    pub processing_time_ms: u128,
}

impl ProcessingStats {
    pub fn failed_files(&self) -> impl Iterator<Item = &FileReport> {
        self.reports.iter().filter(|r| !r.is_success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_arity() {
        assert_eq!(RecordSchema::ValidationOk.expected_arity(), 6);
        assert_eq!(RecordSchema::ValidationError.expected_arity(), 7);
        assert_eq!(RecordSchema::ValidationError.to_string(), "ValidationError");
    }

    #[test]
    fn test_record_iterates_in_canonical_order() {
        let mut record = NormalizedRecord::new();
        record.set(Field::Status, "OK");
        record.set(Field::BankName, "Melli");
        record.set(Field::Date, "2023-01-10");

        let order: Vec<Field> = record.fields().collect();
        assert_eq!(order, vec![Field::BankName, Field::Date, Field::Status]);
    }

    #[test]
    fn test_all_absent() {
        let mut record = NormalizedRecord::new();
        record.set_absent(Field::BankName);
        record.set(Field::Status, "");
        assert!(record.all_absent());

        record.set(Field::Status, "OK");
        assert!(!record.all_absent());
    }
}
