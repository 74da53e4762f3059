//! Upload decoding: one parser per supported file format, each routing
//! decoded records through validation into the sink (store or quarantine).

pub mod csv;
pub mod json;

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::database::RecordStoreError;

/// Destination for parsed records. The record store is the production
/// implementation; tests substitute an in-memory sink.
#[async_trait]
pub trait RecordSink: Send + Sync {
    async fn store_valid(
        &self,
        user_id: Uuid,
        record_type: &str,
        data: &Value,
    ) -> Result<(), RecordStoreError>;

    async fn store_quarantined(
        &self,
        user_id: Uuid,
        record_type: &str,
        data: &Value,
        reason: &str,
    ) -> Result<(), RecordStoreError>;
}

/// Outcome of one upload: how many records went where.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub inserted: usize,
    pub quarantined: usize,
}

impl IngestReport {
    pub fn message(&self) -> String {
        format!(
            "Successfully inserted {} records; quarantined {} records.",
            self.inserted, self.quarantined
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Failed to read CSV headers")]
    CsvHeaders(#[source] ::csv::Error),
    #[error(transparent)]
    Store(#[from] RecordStoreError),
}

/// Decode an uploaded file into records and route each one.
#[async_trait]
pub trait Parser: Send + Sync {
    async fn parse(
        &self,
        sink: &dyn RecordSink,
        user_id: Uuid,
        record_type: &str,
        bytes: &[u8],
    ) -> Result<IngestReport, IngestError>;
}

/// Pick a parser from the uploaded filename, or None for unsupported types.
pub fn parser_for(filename: &str) -> Option<Box<dyn Parser>> {
    let lower = filename.to_ascii_lowercase();
    if lower.ends_with(".csv") {
        Some(Box::new(csv::CsvParser))
    } else if lower.ends_with(".json") {
        Some(Box::new(json::JsonParser))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selects_parser_by_extension() {
        assert!(parser_for("sales.csv").is_some());
        assert!(parser_for("SALES.CSV").is_some());
        assert!(parser_for("sales.json").is_some());
        assert!(parser_for("sales.xml").is_none());
        assert!(parser_for("sales").is_none());
    }

    #[test]
    fn report_message_carries_both_counters() {
        let report = IngestReport { inserted: 3, quarantined: 2 };
        assert_eq!(
            report.message(),
            "Successfully inserted 3 records; quarantined 2 records."
        );
    }
}
