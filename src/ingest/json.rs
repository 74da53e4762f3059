use async_trait::async_trait;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::validate;

use super::{IngestError, IngestReport, Parser, RecordSink};

/// JSON decoder: accepts either an array of record objects or a single
/// record object. Anything else is quarantined whole.
pub struct JsonParser;

#[async_trait]
impl Parser for JsonParser {
    async fn parse(
        &self,
        sink: &dyn RecordSink,
        user_id: Uuid,
        record_type: &str,
        bytes: &[u8],
    ) -> Result<IngestReport, IngestError> {
        let mut report = IngestReport::default();

        if let Ok(records) = serde_json::from_slice::<Vec<Map<String, Value>>>(bytes) {
            for record in records {
                route_record(sink, user_id, record_type, record, &mut report).await?;
            }
            return Ok(report);
        }

        if let Ok(record) = serde_json::from_slice::<Map<String, Value>>(bytes) {
            route_record(sink, user_id, record_type, record, &mut report).await?;
            return Ok(report);
        }

        // Neither an array of objects nor a single object: keep the raw
        // payload so the upload remains inspectable
        let raw = Value::String(String::from_utf8_lossy(bytes).into_owned());
        sink.store_quarantined(user_id, record_type, &raw, "Invalid JSON structure")
            .await?;
        report.quarantined += 1;

        Ok(report)
    }
}

async fn route_record(
    sink: &dyn RecordSink,
    user_id: Uuid,
    record_type: &str,
    record: Map<String, Value>,
    report: &mut IngestReport,
) -> Result<(), crate::database::RecordStoreError> {
    if !validate::is_valid_record(&record) {
        sink.store_quarantined(user_id, record_type, &Value::Object(record), "Failed validation")
            .await?;
        report.quarantined += 1;
    } else {
        sink.store_valid(user_id, record_type, &Value::Object(record)).await?;
        report.inserted += 1;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemorySink;
    use serde_json::json;

    const USER: Uuid = Uuid::nil();

    #[tokio::test]
    async fn routes_each_element_of_an_array() {
        let sink = MemorySink::new();
        let bytes = serde_json::to_vec(&json!([
            { "userId": "u-1", "price": 10 },
            { "price": 20 },
            { "userId": "u-3", "nested": { "qty": 2 } }
        ]))
        .unwrap();

        let report = JsonParser
            .parse(&sink, USER, "sales", &bytes)
            .await
            .unwrap();

        assert_eq!(report, IngestReport { inserted: 2, quarantined: 1 });
        assert_eq!(sink.quarantined()[0].reason, "Failed validation");
        assert_eq!(sink.quarantined()[0].data, json!({ "price": 20 }));
    }

    #[tokio::test]
    async fn accepts_a_single_object() {
        let sink = MemorySink::new();
        let bytes = serde_json::to_vec(&json!({ "userId": "u-1", "price": 10 })).unwrap();

        let report = JsonParser
            .parse(&sink, USER, "sales", &bytes)
            .await
            .unwrap();

        assert_eq!(report, IngestReport { inserted: 1, quarantined: 0 });
    }

    #[tokio::test]
    async fn quarantines_a_single_invalid_object() {
        let sink = MemorySink::new();
        let bytes = serde_json::to_vec(&json!({ "price": 10 })).unwrap();

        let report = JsonParser
            .parse(&sink, USER, "sales", &bytes)
            .await
            .unwrap();

        assert_eq!(report, IngestReport { inserted: 0, quarantined: 1 });
        assert_eq!(sink.quarantined()[0].reason, "Failed validation");
    }

    #[tokio::test]
    async fn quarantines_unparseable_bytes_whole() {
        let sink = MemorySink::new();
        let report = JsonParser
            .parse(&sink, USER, "sales", b"this is not json")
            .await
            .unwrap();

        assert_eq!(report, IngestReport { inserted: 0, quarantined: 1 });
        let quarantined = sink.quarantined();
        assert_eq!(quarantined[0].reason, "Invalid JSON structure");
        assert_eq!(quarantined[0].data, json!("this is not json"));
    }

    #[tokio::test]
    async fn quarantines_array_of_scalars_whole() {
        // An array whose elements are not objects fails both decode
        // attempts and is kept as one quarantined payload
        let sink = MemorySink::new();
        let report = JsonParser
            .parse(&sink, USER, "sales", b"[1, 2, 3]")
            .await
            .unwrap();

        assert_eq!(report, IngestReport { inserted: 0, quarantined: 1 });
        assert_eq!(sink.quarantined()[0].reason, "Invalid JSON structure");
    }
}
