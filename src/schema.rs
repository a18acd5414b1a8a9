//! Schema tables, file classification and positional field mapping.
//!
//! Both record layouts are declared here as static field-order tables that
//! every stage consults by index, together with the destination column
//! widths that the size constraint enforcer and the relational sink share.

use crate::error::{CleanerError, Result};
use crate::models::{Field, NormalizedRecord, RawRecord, RecordSchema};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

/// File name pattern for validation logs
pub const FILE_PATTERN: &str = r"(ValidationError|ValidationOk)\d*\.txt";

static FILE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(FILE_PATTERN).expect("file pattern is a valid regex"));

static ANCHORED_FILE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("^{}", FILE_PATTERN)).expect("file pattern is a valid regex")
});

const VALIDATION_OK_RAW: [Field; 6] = [
    Field::BankName,
    Field::AccountNumber,
    Field::ShebaNumber,
    Field::NationalCode,
    Field::TransactionTime,
    Field::Status,
];

const VALIDATION_ERROR_RAW: [Field; 7] = [
    Field::BankName,
    Field::AccountNumber,
    Field::ShebaNumber,
    Field::NationalCode,
    Field::TransactionTime,
    Field::ErrorCode,
    Field::Status,
];

const VALIDATION_OK_CANONICAL: [Field; 10] = [
    Field::BankName,
    Field::AccountNumber,
    Field::ShebaNumber,
    Field::NationalCode,
    Field::Date,
    Field::TransactionTime,
    Field::Status,
    Field::FileName,
    Field::Type,
    Field::ProcessedAt,
];

const VALIDATION_ERROR_CANONICAL: [Field; 11] = [
    Field::BankName,
    Field::AccountNumber,
    Field::ShebaNumber,
    Field::NationalCode,
    Field::Date,
    Field::TransactionTime,
    Field::ErrorCode,
    Field::Status,
    Field::FileName,
    Field::Type,
    Field::ProcessedAt,
];

/// Positional layout of a source line
pub fn raw_field_order(schema: RecordSchema) -> &'static [Field] {
    match schema {
        RecordSchema::ValidationOk => &VALIDATION_OK_RAW,
        RecordSchema::ValidationError => &VALIDATION_ERROR_RAW,
    }
}

/// Output layout after enrichment
pub fn canonical_field_order(schema: RecordSchema) -> &'static [Field] {
    match schema {
        RecordSchema::ValidationOk => &VALIDATION_OK_CANONICAL,
        RecordSchema::ValidationError => &VALIDATION_ERROR_CANONICAL,
    }
}

/// Destination column type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Varchar(usize),
    NVarchar(usize),
}

impl ColumnType {
    pub fn width(&self) -> usize {
        match self {
            ColumnType::Varchar(n) | ColumnType::NVarchar(n) => *n,
        }
    }

    pub fn ddl(&self) -> String {
        match self {
            ColumnType::Varchar(n) => format!("VARCHAR({})", n),
            ColumnType::NVarchar(n) => format!("NVARCHAR({})", n),
        }
    }
}

impl Field {
    /// Column type of this field in the destination tables
    pub fn column_type(&self) -> ColumnType {
        match self {
            Field::BankName => ColumnType::NVarchar(100),
            Field::AccountNumber => ColumnType::Varchar(50),
            Field::ShebaNumber => ColumnType::Varchar(50),
            Field::NationalCode => ColumnType::Varchar(30),
            Field::Date => ColumnType::Varchar(10),
            Field::TransactionTime => ColumnType::Varchar(21),
            Field::ErrorCode => ColumnType::Varchar(10),
            Field::Status => ColumnType::NVarchar(1000),
            Field::FileName => ColumnType::NVarchar(256),
            Field::Type => ColumnType::Varchar(20),
            Field::ProcessedAt => ColumnType::Varchar(30),
        }
    }

    /// Maximum character length accepted by the destination column
    pub fn max_len(&self) -> usize {
        self.column_type().width()
    }
}

/// Determine the record schema from a file name
pub fn classify(file_name: &str) -> Result<RecordSchema> {
    let captures =
        FILE_REGEX
            .captures(file_name)
            .ok_or_else(|| CleanerError::UnrecognizedFileType {
                file_name: file_name.to_string(),
            })?;

    // The pattern only captures the two type names
    if &captures[1] == "ValidationOk" {
        Ok(RecordSchema::ValidationOk)
    } else {
        Ok(RecordSchema::ValidationError)
    }
}

/// Determine the record schema from a path's final component
pub fn classify_path(path: &Path) -> Result<RecordSchema> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    classify(&file_name)
}

/// Whether a directory entry should be picked up for processing.
///
/// The name has to start with the pattern, unlike [`classify`] which only
/// searches for it.
pub fn is_candidate(file_name: &str) -> bool {
    ANCHORED_FILE_REGEX.is_match(file_name)
}

/// Assign canonical names to a raw record's positional fields.
///
/// Missing trailing positions are recorded as absent; surplus positions are
/// dropped.
pub fn map_record(raw: &RawRecord, schema: RecordSchema) -> NormalizedRecord {
    let mut record = NormalizedRecord::new();
    for (index, field) in schema.raw_fields().iter().enumerate() {
        match raw.fields.get(index) {
            Some(value) => record.set(*field, value.as_str()),
            None => record.set_absent(*field),
        }
    }
    record
}

/// Map every raw record of a file
pub fn map_records(raw: &[RawRecord], schema: RecordSchema) -> Vec<NormalizedRecord> {
    let surplus = raw
        .iter()
        .filter(|r| r.arity() > schema.expected_arity())
        .count();
    if surplus > 0 {
        debug!(
            "{} {} records carried more than {} fields; extra positions dropped",
            surplus,
            schema,
            schema.expected_arity()
        );
    }
    raw.iter().map(|r| map_record(r, schema)).collect()
}
