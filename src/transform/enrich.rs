//! Metadata enrichment
//!
//! Adds the derived `Date` column and the provenance columns (`FileName`,
//! `Type`, `ProcessedAt`) and leaves each record holding exactly the
//! schema's canonical fields.

use crate::error::{CleanerError, Result};
use crate::models::{Field, NormalizedRecord, RecordSchema};
use chrono::Local;

/// Characters of `TransactionTime` forming the ISO date prefix
const DATE_PREFIX_LEN: usize = 10;

/// Current local time in ISO-8601 form with microseconds
pub fn processing_timestamp() -> String {
    Local::now()
        .naive_local()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}

/// First ten characters of a transaction time, or empty
pub fn date_prefix(transaction_time: &str) -> String {
    transaction_time.chars().take(DATE_PREFIX_LEN).collect()
}

/// Enriches the records of one file
#[derive(Debug, Clone)]
pub struct Enricher {
    schema: RecordSchema,
    file_name: String,
    processed_at: String,
}

impl Enricher {
    /// `processed_at` is stamped on every record so the whole file shares one instant
    pub fn new(schema: RecordSchema, file_name: impl Into<String>, processed_at: impl Into<String>) -> Self {
        Self {
            schema,
            file_name: file_name.into(),
            processed_at: processed_at.into(),
        }
    }

    pub fn enrich(&self, records: &mut [NormalizedRecord]) -> Result<()> {
        for (index, record) in records.iter_mut().enumerate() {
            self.enrich_record(record).map_err(|reason| CleanerError::EnrichmentFailure {
                reason: format!("record {}: {}", index + 1, reason),
            })?;
        }
        Ok(())
    }

    fn enrich_record(&self, record: &mut NormalizedRecord) -> std::result::Result<(), String> {
        let transaction_time = record
            .get(Field::TransactionTime)
            .ok_or_else(|| "TransactionTime has not been normalized".to_string())?;

        let date = date_prefix(transaction_time);
        record.set(Field::Date, date);
        record.set(Field::FileName, self.file_name.as_str());
        record.set(Field::Type, self.schema.as_str());
        record.set(Field::ProcessedAt, self.processed_at.as_str());

        let canonical = self.schema.canonical_fields();
        let foreign: Vec<Field> = record.fields().filter(|f| !canonical.contains(f)).collect();
        for field in foreign {
            record.remove(field);
        }

        if let Some(missing) = canonical.iter().find(|f| record.get(**f).is_none()) {
            return Err(format!("{} is missing after enrichment", missing));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::normalize::Normalizer;
    use crate::models::RawRecord;
    use crate::schema::map_record;

    fn normalized(fields: &[&str], schema: RecordSchema) -> NormalizedRecord {
        let raw: RawRecord = fields.iter().copied().collect();
        let (mut records, _) = Normalizer::new(schema)
            .normalize(vec![map_record(&raw, schema)])
            .unwrap();
        records.remove(0)
    }

    #[test]
    fn test_date_prefix() {
        assert_eq!(date_prefix("2023-01-10T10:00:00"), "2023-01-10");
        assert_eq!(date_prefix("2023-01"), "2023-01");
        assert_eq!(date_prefix(""), "");
        assert_eq!(date_prefix("۱۴۰۲-۱۰-۲۰ ۱۰:۰۰"), "۱۴۰۲-۱۰-۲۰");
    }

    #[test]
    fn test_enrich_ok_record() {
        let mut records = vec![normalized(
            &["Bank: Melli", "Acc: 123", "Sheba: IR12", "NC: 0012345678", "TT: 2023-01-10T10:00:00", "St: OK"],
            RecordSchema::ValidationOk,
        )];
        Enricher::new(RecordSchema::ValidationOk, "ValidationOk1.txt", "2024-05-01T08:30:00.000001")
            .enrich(&mut records)
            .unwrap();

        let record = &records[0];
        let order: Vec<Field> = record.fields().collect();
        assert_eq!(order, RecordSchema::ValidationOk.canonical_fields().to_vec());
        assert_eq!(record.get(Field::Date), Some("2023-01-10"));
        assert_eq!(record.get(Field::FileName), Some("ValidationOk1.txt"));
        assert_eq!(record.get(Field::Type), Some("ValidationOk"));
        assert_eq!(record.get(Field::ProcessedAt), Some("2024-05-01T08:30:00.000001"));
        assert!(!record.contains(Field::ErrorCode));
    }

    #[test]
    fn test_empty_transaction_time_gives_empty_date() {
        let mut records = vec![normalized(&["Bank: Melli"], RecordSchema::ValidationError)];
        Enricher::new(RecordSchema::ValidationError, "ValidationError2.txt", "now")
            .enrich(&mut records)
            .unwrap();

        assert_eq!(records[0].get(Field::Date), Some(""));
        assert_eq!(records[0].get(Field::ErrorCode), Some(""));
        assert_eq!(records[0].len(), 11);
    }

    #[test]
    fn test_unnormalized_record_is_an_enrichment_failure() {
        let mut record = NormalizedRecord::new();
        record.set(Field::BankName, "Melli");

        let result = Enricher::new(RecordSchema::ValidationOk, "ValidationOk.txt", "now")
            .enrich(&mut [record]);
        assert!(matches!(result, Err(CleanerError::EnrichmentFailure { .. })));
    }

    #[test]
    fn test_processing_timestamp_is_iso8601() {
        let stamp = processing_timestamp();
        assert_eq!(stamp.len(), 26);
        assert!(chrono::NaiveDateTime::parse_from_str(&stamp, "%Y-%m-%dT%H:%M:%S%.6f").is_ok());
    }
}
