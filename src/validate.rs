use serde_json::{Map, Value};

/// Key every stored record must carry. Records are otherwise schema-less.
pub const REQUIRED_RECORD_KEY: &str = "userId";

/// Minimal acceptance check for a parsed record: presence of the identifying
/// key. The value is not inspected.
pub fn is_valid_record(record: &Map<String, Value>) -> bool {
    record.contains_key(REQUIRED_RECORD_KEY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn as_map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn accepts_record_with_identifying_key() {
        let record = as_map(json!({ "userId": "u-1", "price": 10 }));
        assert!(is_valid_record(&record));
    }

    #[test]
    fn rejects_record_without_identifying_key() {
        let record = as_map(json!({ "price": 10 }));
        assert!(!is_valid_record(&record));
    }

    #[test]
    fn value_of_identifying_key_is_not_inspected() {
        let record = as_map(json!({ "userId": null }));
        assert!(is_valid_record(&record));
    }
}
