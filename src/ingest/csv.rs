use async_trait::async_trait;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::validate;

use super::{IngestError, IngestReport, Parser, RecordSink};

/// CSV decoder: first row is the header, each following row becomes a
/// string-valued record keyed by header.
pub struct CsvParser;

#[async_trait]
impl Parser for CsvParser {
    async fn parse(
        &self,
        sink: &dyn RecordSink,
        user_id: Uuid,
        record_type: &str,
        bytes: &[u8],
    ) -> Result<IngestReport, IngestError> {
        // flexible: rows of uneven length must reach the quarantine path
        // below instead of aborting the whole upload
        let mut reader = ::csv::ReaderBuilder::new().flexible(true).from_reader(bytes);

        let headers = reader
            .headers()
            .map_err(IngestError::CsvHeaders)?
            .clone();

        let mut report = IngestReport::default();

        for row in reader.records() {
            let row = match row {
                Ok(row) => row,
                Err(_) => {
                    sink.store_quarantined(user_id, record_type, &Value::Null, "Error reading CSV")
                        .await?;
                    report.quarantined += 1;
                    continue;
                }
            };

            if row.len() != headers.len() {
                let cells: Vec<Value> =
                    row.iter().map(|cell| Value::String(cell.to_string())).collect();
                sink.store_quarantined(
                    user_id,
                    record_type,
                    &Value::Array(cells),
                    "Mismatched header and record lengths",
                )
                .await?;
                report.quarantined += 1;
                continue;
            }

            let record = row_to_record(&headers, &row);
            if !validate::is_valid_record(&record) {
                sink.store_quarantined(
                    user_id,
                    record_type,
                    &Value::Object(record),
                    "Failed validation",
                )
                .await?;
                report.quarantined += 1;
                continue;
            }

            sink.store_valid(user_id, record_type, &Value::Object(record)).await?;
            report.inserted += 1;
        }

        Ok(report)
    }
}

fn row_to_record(headers: &::csv::StringRecord, row: &::csv::StringRecord) -> Map<String, Value> {
    headers
        .iter()
        .zip(row.iter())
        .map(|(key, cell)| (key.to_string(), Value::String(cell.to_string())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemorySink;
    use serde_json::json;

    const USER: Uuid = Uuid::nil();

    #[tokio::test]
    async fn inserts_rows_keyed_by_header() {
        let sink = MemorySink::new();
        let bytes = b"userId,price\nu-1,10\nu-2,20\n";

        let report = CsvParser
            .parse(&sink, USER, "sales", bytes)
            .await
            .unwrap();

        assert_eq!(report, IngestReport { inserted: 2, quarantined: 0 });
        let valid = sink.valid();
        assert_eq!(valid[0].data, json!({ "userId": "u-1", "price": "10" }));
        assert_eq!(valid[1].data, json!({ "userId": "u-2", "price": "20" }));
        assert!(valid.iter().all(|r| r.record_type == "sales"));
    }

    #[tokio::test]
    async fn quarantines_rows_with_mismatched_length() {
        let sink = MemorySink::new();
        let bytes = b"userId,price\nu-1,10,extra\nu-2,20\n";

        let report = CsvParser
            .parse(&sink, USER, "sales", bytes)
            .await
            .unwrap();

        assert_eq!(report, IngestReport { inserted: 1, quarantined: 1 });
        let quarantined = sink.quarantined();
        assert_eq!(quarantined[0].reason, "Mismatched header and record lengths");
        assert_eq!(quarantined[0].data, json!(["u-1", "10", "extra"]));
    }

    #[tokio::test]
    async fn quarantines_rows_missing_identifying_key() {
        let sink = MemorySink::new();
        let bytes = b"name,price\nwidget,10\n";

        let report = CsvParser
            .parse(&sink, USER, "sales", bytes)
            .await
            .unwrap();

        assert_eq!(report, IngestReport { inserted: 0, quarantined: 1 });
        assert_eq!(sink.quarantined()[0].reason, "Failed validation");
    }

    #[tokio::test]
    async fn header_only_file_inserts_nothing() {
        let sink = MemorySink::new();
        let report = CsvParser
            .parse(&sink, USER, "sales", b"userId,price\n")
            .await
            .unwrap();

        assert_eq!(report, IngestReport::default());
    }
}
