//! Field normalization
//!
//! Every value loses the shortest leading substring that ends with a colon
//! and is trimmed. Rows left without any content are dropped and remaining
//! absent values become empty strings. No field gets special treatment.

use crate::error::{CleanerError, Result};
use crate::models::{NormalizedRecord, RecordSchema};
use tracing::debug;

/// Remove everything up to and including the first colon, then trim.
///
/// Values without a colon are only trimmed.
pub fn strip_label(value: &str) -> String {
    let unlabelled = match value.split_once(':') {
        Some((_, rest)) => rest,
        None => value,
    };
    unlabelled.trim().to_string()
}

#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    schema: RecordSchema,
}

impl Normalizer {
    pub fn new(schema: RecordSchema) -> Self {
        Self { schema }
    }

    /// Normalize mapped records, returning them with the empty rows removed
    /// and the number of rows dropped.
    pub fn normalize(
        &self,
        records: Vec<NormalizedRecord>,
    ) -> Result<(Vec<NormalizedRecord>, usize)> {
        let allowed = self.schema.raw_fields();
        let before = records.len();
        let mut normalized = Vec::with_capacity(before);

        for (index, mut record) in records.into_iter().enumerate() {
            if let Some(unexpected) = record.fields().find(|f| !allowed.contains(f)) {
                return Err(CleanerError::NormalizationFailure {
                    reason: format!(
                        "record {} carries field {} which is not part of the {} layout",
                        index + 1,
                        unexpected,
                        self.schema
                    ),
                });
            }

            for (_, value) in record.values_mut() {
                if let Some(v) = value.as_mut() {
                    *v = strip_label(v);
                }
            }

            if record.all_absent() {
                continue;
            }

            for (_, value) in record.values_mut() {
                if value.is_none() {
                    *value = Some(String::new());
                }
            }
            normalized.push(record);
        }

        let dropped = before - normalized.len();
        if dropped > 0 {
            debug!("Dropped {} rows without content", dropped);
        }

        Ok((normalized, dropped))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Field, RawRecord};
    use crate::schema::map_record;

    fn mapped(fields: &[&str], schema: RecordSchema) -> NormalizedRecord {
        let raw: RawRecord = fields.iter().copied().collect();
        map_record(&raw, schema)
    }

    #[test]
    fn test_strip_label() {
        assert_eq!(strip_label("Status: OK"), "OK");
        assert_eq!(strip_label("  Bank:Melli  "), "Melli");
        assert_eq!(strip_label("no label here "), "no label here");
        assert_eq!(strip_label("TT: 2023-01-10T10:00:00"), "2023-01-10T10:00:00");
        assert_eq!(strip_label("a:b:c"), "b:c");
        assert_eq!(strip_label(":"), "");
        assert_eq!(strip_label(""), "");
    }

    #[test]
    fn test_normalize_scenario_line() {
        let record = mapped(
            &[
                "Bank: Melli",
                "Acc: 123",
                "Sheba: IR12",
                "NC: 0012345678",
                "TT: 2023-01-10T10:00:00",
                "St: OK",
            ],
            RecordSchema::ValidationOk,
        );
        let (records, dropped) = Normalizer::new(RecordSchema::ValidationOk)
            .normalize(vec![record])
            .unwrap();

        assert_eq!(dropped, 0);
        let record = &records[0];
        assert_eq!(record.get(Field::BankName), Some("Melli"));
        assert_eq!(record.get(Field::AccountNumber), Some("123"));
        assert_eq!(record.get(Field::ShebaNumber), Some("IR12"));
        assert_eq!(record.get(Field::NationalCode), Some("0012345678"));
        assert_eq!(record.get(Field::TransactionTime), Some("2023-01-10T10:00:00"));
        assert_eq!(record.get(Field::Status), Some("OK"));
    }

    #[test]
    fn test_rows_empty_after_stripping_are_dropped() {
        let records = vec![
            mapped(&["Bank:", " Acc: ", "", "NC:", "", "St:  "], RecordSchema::ValidationOk),
            mapped(&["Bank: Tejarat"], RecordSchema::ValidationOk),
        ];
        let (records, dropped) = Normalizer::new(RecordSchema::ValidationOk)
            .normalize(records)
            .unwrap();

        assert_eq!(dropped, 1);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get(Field::BankName), Some("Tejarat"));
    }

    #[test]
    fn test_absent_fields_become_empty_strings() {
        let record = mapped(&["Bank: Melli", "Acc: 9"], RecordSchema::ValidationError);
        let (records, _) = Normalizer::new(RecordSchema::ValidationError)
            .normalize(vec![record])
            .unwrap();

        let record = &records[0];
        assert_eq!(record.len(), 7);
        assert_eq!(record.get(Field::ErrorCode), Some(""));
        assert_eq!(record.get(Field::Status), Some(""));
    }

    #[test]
    fn test_foreign_field_is_a_normalization_failure() {
        let record = mapped(&["a", "b", "c", "d", "e", "f", "g"], RecordSchema::ValidationError);
        let result = Normalizer::new(RecordSchema::ValidationOk).normalize(vec![record]);

        assert!(matches!(
            result,
            Err(CleanerError::NormalizationFailure { .. })
        ));
    }
}
