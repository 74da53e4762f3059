//! Dotted field-path discovery over schema-less records.
//!
//! Uploaded records carry no schema, so the queryable surface of a record
//! type is whatever paths have actually been observed. `field_paths` flattens
//! one record into its paths; the store merges those into the per-user,
//! per-record-type catalog that clients enumerate before aggregating.

use serde_json::Value;

/// Flatten a record into its set of dotted field paths.
///
/// Objects recurse with `prefix.key`. Arrays are transparent: elements are
/// visited under the unchanged prefix, so `{"a": [{"b": 1}]}` yields `a.b`.
/// Scalars terminate a path; a scalar at the root names no field and
/// contributes nothing. The result is sorted and deduplicated.
pub fn field_paths(value: &Value) -> Vec<String> {
    let mut paths = Vec::new();
    walk(value, "", &mut paths);
    paths.sort();
    paths.dedup();
    paths
}

fn walk(value: &Value, prefix: &str, paths: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let full_path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                walk(child, &full_path, paths);
            }
        }
        Value::Array(items) => {
            for item in items {
                walk(item, prefix, paths);
            }
        }
        _ => {
            if !prefix.is_empty() {
                paths.push(prefix.to_string());
            }
        }
    }
}

/// Collect every value reachable at `path` within a record.
///
/// Path segments index into objects; arrays are descended element-wise at any
/// depth, mirroring how `field_paths` treats them as transparent. A record
/// that never reaches the path yields an empty list.
pub fn values_at_path<'a>(value: &'a Value, path: &str) -> Vec<&'a Value> {
    let segments: Vec<&str> = path.split('.').collect();
    let mut found = Vec::new();
    collect(value, &segments, &mut found);
    found
}

fn collect<'a>(value: &'a Value, segments: &[&str], found: &mut Vec<&'a Value>) {
    if let Value::Array(items) = value {
        for item in items {
            collect(item, segments, found);
        }
        return;
    }

    match segments.split_first() {
        None => found.push(value),
        Some((head, rest)) => {
            if let Value::Object(map) = value {
                if let Some(child) = map.get(*head) {
                    collect(child, rest, found);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flattens_nested_objects() {
        let record = json!({
            "price": 10.5,
            "customer": { "name": "ACME", "address": { "city": "Oslo" } }
        });

        assert_eq!(
            field_paths(&record),
            vec!["customer.address.city", "customer.name", "price"]
        );
    }

    #[test]
    fn arrays_are_transparent() {
        let record = json!({
            "items": [
                { "sku": "a-1", "qty": 2 },
                { "sku": "a-2", "price": 3.5 }
            ]
        });

        assert_eq!(field_paths(&record), vec!["items.price", "items.qty", "items.sku"]);
    }

    #[test]
    fn flat_string_map_yields_keys() {
        let record = json!({ "price": "10", "quantity": "3" });
        assert_eq!(field_paths(&record), vec!["price", "quantity"]);
    }

    #[test]
    fn deduplicates_paths_across_array_elements() {
        let record = json!({ "rows": [{ "v": 1 }, { "v": 2 }, { "v": 3 }] });
        assert_eq!(field_paths(&record), vec!["rows.v"]);
    }

    #[test]
    fn root_scalar_names_no_field() {
        assert!(field_paths(&json!(42)).is_empty());
        assert!(field_paths(&json!({})).is_empty());
    }

    #[test]
    fn looks_up_top_level_value() {
        let record = json!({ "price": 10.5 });
        assert_eq!(values_at_path(&record, "price"), vec![&json!(10.5)]);
    }

    #[test]
    fn looks_up_nested_values_through_arrays() {
        let record = json!({
            "items": [ { "qty": 2 }, { "qty": 5 }, { "sku": "x" } ]
        });

        assert_eq!(
            values_at_path(&record, "items.qty"),
            vec![&json!(2), &json!(5)]
        );
    }

    #[test]
    fn missing_path_yields_nothing() {
        let record = json!({ "price": 1 });
        assert!(values_at_path(&record, "quantity").is_empty());
        assert!(values_at_path(&record, "price.sub").is_empty());
    }

    #[test]
    fn terminal_array_of_scalars_yields_each_element() {
        let record = json!({ "scores": [1, 2, 3] });
        assert_eq!(
            values_at_path(&record, "scores"),
            vec![&json!(1), &json!(2), &json!(3)]
        );
    }
}
