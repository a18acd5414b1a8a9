//! Destination column-width enforcement
//!
//! Values are truncated, never rejected, to the width of their destination
//! column. Runs immediately before any sink write.

use crate::models::{NormalizedRecord, RecordSchema};

/// First `max` characters of `value`
pub fn truncate_chars(value: &str, max: usize) -> &str {
    match value.char_indices().nth(max) {
        Some((byte_index, _)) => &value[..byte_index],
        None => value,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SizeConstraintEnforcer {
    schema: RecordSchema,
}

impl SizeConstraintEnforcer {
    pub fn new(schema: RecordSchema) -> Self {
        Self { schema }
    }

    /// Truncate every canonical field in place, returning how many values
    /// were shortened.
    pub fn enforce(&self, records: &mut [NormalizedRecord]) -> usize {
        let canonical = self.schema.canonical_fields();
        let mut truncated = 0;

        for record in records.iter_mut() {
            for (field, value) in record.values_mut() {
                if !canonical.contains(field) {
                    continue;
                }
                if let Some(v) = value.as_mut() {
                    let limit = field.max_len();
                    let kept = truncate_chars(v, limit).len();
                    if kept < v.len() {
                        v.truncate(kept);
                        truncated += 1;
                    }
                }
            }
        }

        truncated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Field;

    fn record_with(field: Field, value: &str) -> NormalizedRecord {
        let mut record = NormalizedRecord::new();
        record.set(field, value);
        record
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("abcdef", 3), "abc");
        assert_eq!(truncate_chars("abc", 3), "abc");
        assert_eq!(truncate_chars("ab", 3), "ab");
        assert_eq!(truncate_chars("بانک ملی", 4), "بانک");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn test_long_values_are_truncated_to_column_width() {
        let long_status = "x".repeat(1500);
        let mut records = vec![
            record_with(Field::Status, &long_status),
            record_with(Field::TransactionTime, "2023-01-10T10:00:00.123456"),
            record_with(Field::ErrorCode, "E-0000000001"),
        ];

        let truncated = SizeConstraintEnforcer::new(RecordSchema::ValidationError).enforce(&mut records);

        assert_eq!(truncated, 3);
        assert_eq!(records[0].get(Field::Status).unwrap().len(), 1000);
        assert_eq!(records[1].get(Field::TransactionTime), Some("2023-01-10T10:00:00.1"));
        assert_eq!(records[2].get(Field::ErrorCode), Some("E-00000000"));
    }

    #[test]
    fn test_width_counts_characters_not_bytes() {
        let name = "ب".repeat(120);
        let mut records = vec![record_with(Field::BankName, &name)];
        SizeConstraintEnforcer::new(RecordSchema::ValidationOk).enforce(&mut records);

        assert_eq!(records[0].get(Field::BankName).unwrap().chars().count(), 100);
    }

    #[test]
    fn test_enforcement_is_idempotent() {
        let mut records = vec![
            record_with(Field::Status, &"y".repeat(2000)),
            record_with(Field::BankName, "Melli"),
        ];
        let enforcer = SizeConstraintEnforcer::new(RecordSchema::ValidationOk);

        enforcer.enforce(&mut records);
        let once = records.clone();
        let second_pass = enforcer.enforce(&mut records);

        assert_eq!(second_pass, 0);
        assert_eq!(records, once);
    }
}
