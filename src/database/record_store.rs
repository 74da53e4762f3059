use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::fields;
use crate::ingest::RecordSink;

use super::models::UserRecord;

#[derive(Debug, thiserror::Error)]
pub enum RecordStoreError {
    #[error("failed to convert field value to float: {field} = {value:?}")]
    NonNumericValue { field: String, value: String },
    #[error("unsupported field value type for {field}: {kind}")]
    UnsupportedValueType { field: String, kind: &'static str },
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Persistence for uploaded records, their quarantine, and the per-user,
/// per-record-type field catalog.
pub struct RecordStore {
    pool: PgPool,
}

impl RecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persist a validated record and merge its field paths into the catalog.
    pub async fn insert_valid(
        &self,
        user_id: Uuid,
        record_type: &str,
        data: &Value,
    ) -> Result<(), RecordStoreError> {
        sqlx::query("INSERT INTO records (id, user_id, record_type, data) VALUES ($1, $2, $3, $4)")
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(record_type)
            .bind(data)
            .execute(&self.pool)
            .await?;

        self.register_fields(user_id, record_type, data).await
    }

    /// Merge the record's dotted field paths into the catalog for
    /// (user, record_type). The set-merge upsert keeps the stored array
    /// deduplicated and sorted.
    async fn register_fields(
        &self,
        user_id: Uuid,
        record_type: &str,
        data: &Value,
    ) -> Result<(), RecordStoreError> {
        let paths = fields::field_paths(data);
        if paths.is_empty() {
            return Ok(());
        }

        sqlx::query(
            r#"
            INSERT INTO record_fields (user_id, record_type, fields)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, record_type) DO UPDATE
            SET fields = ARRAY(
                SELECT DISTINCT f
                FROM unnest(record_fields.fields || EXCLUDED.fields) AS f
                ORDER BY f
            )
            "#,
        )
        .bind(user_id)
        .bind(record_type)
        .bind(&paths)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Persist a rejected payload together with the rejection reason.
    /// Quarantined data never feeds the field catalog.
    pub async fn insert_quarantined(
        &self,
        user_id: Uuid,
        record_type: &str,
        data: &Value,
        reason: &str,
    ) -> Result<(), RecordStoreError> {
        sqlx::query(
            "INSERT INTO quarantine (id, user_id, record_type, data, reason) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(record_type)
        .bind(data)
        .bind(reason)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// List the user's valid records, optionally bounded by an inclusive
    /// storage-timestamp range.
    pub async fn user_data(
        &self,
        user_id: Uuid,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<UserRecord>, RecordStoreError> {
        let records = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT record_type, data, stored_at
            FROM records
            WHERE user_id = $1
              AND ($2::timestamptz IS NULL OR stored_at >= $2)
              AND ($3::timestamptz IS NULL OR stored_at <= $3)
            ORDER BY stored_at
            "#,
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Distinct record types observed for a user, from the field catalog.
    pub async fn record_types(&self, user_id: Uuid) -> Result<Vec<String>, RecordStoreError> {
        let types = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT record_type FROM record_fields WHERE user_id = $1 ORDER BY record_type",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(types)
    }

    /// The field catalog for (user, record_type). An unknown pair yields an
    /// empty list, not an error.
    pub async fn fields(
        &self,
        user_id: Uuid,
        record_type: &str,
    ) -> Result<Vec<String>, RecordStoreError> {
        let fields = sqlx::query_scalar::<_, Vec<String>>(
            "SELECT fields FROM record_fields WHERE user_id = $1 AND record_type = $2",
        )
        .bind(user_id)
        .bind(record_type)
        .fetch_optional(&self.pool)
        .await?;

        Ok(fields.unwrap_or_default())
    }

    /// Fetch the numeric values found at `field_path` across the user's
    /// records of the given type. Records without the path are skipped;
    /// arrays along the path contribute each element.
    pub async fn numeric_values(
        &self,
        user_id: Uuid,
        record_type: &str,
        field_path: &str,
    ) -> Result<Vec<f64>, RecordStoreError> {
        let rows = sqlx::query_scalar::<_, Value>(
            "SELECT data FROM records WHERE user_id = $1 AND record_type = $2",
        )
        .bind(user_id)
        .bind(record_type)
        .fetch_all(&self.pool)
        .await?;

        let mut values = Vec::new();
        for data in &rows {
            for value in fields::values_at_path(data, field_path) {
                values.push(numeric_value(field_path, value)?);
            }
        }
        Ok(values)
    }
}

/// Coerce a discovered JSON value to f64: numbers are used directly, strings
/// are parsed. Anything else is a hard error so a bad aggregation surfaces
/// instead of silently skewing the result.
fn numeric_value(field: &str, value: &Value) -> Result<f64, RecordStoreError> {
    match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| RecordStoreError::NonNumericValue {
            field: field.to_string(),
            value: n.to_string(),
        }),
        Value::String(s) => s.parse::<f64>().map_err(|_| RecordStoreError::NonNumericValue {
            field: field.to_string(),
            value: s.clone(),
        }),
        Value::Bool(_) => Err(RecordStoreError::UnsupportedValueType {
            field: field.to_string(),
            kind: "boolean",
        }),
        Value::Null => Err(RecordStoreError::UnsupportedValueType {
            field: field.to_string(),
            kind: "null",
        }),
        Value::Array(_) => Err(RecordStoreError::UnsupportedValueType {
            field: field.to_string(),
            kind: "array",
        }),
        Value::Object(_) => Err(RecordStoreError::UnsupportedValueType {
            field: field.to_string(),
            kind: "object",
        }),
    }
}

#[async_trait]
impl RecordSink for RecordStore {
    async fn store_valid(
        &self,
        user_id: Uuid,
        record_type: &str,
        data: &Value,
    ) -> Result<(), RecordStoreError> {
        self.insert_valid(user_id, record_type, data).await
    }

    async fn store_quarantined(
        &self,
        user_id: Uuid,
        record_type: &str,
        data: &Value,
        reason: &str,
    ) -> Result<(), RecordStoreError> {
        self.insert_quarantined(user_id, record_type, data, reason).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_value_accepts_numbers_and_numeric_strings() {
        assert_eq!(numeric_value("price", &json!(10.5)).unwrap(), 10.5);
        assert_eq!(numeric_value("price", &json!(3)).unwrap(), 3.0);
        assert_eq!(numeric_value("price", &json!("2.25")).unwrap(), 2.25);
    }

    #[test]
    fn numeric_value_rejects_non_numeric_string() {
        let err = numeric_value("price", &json!("n/a")).unwrap_err();
        assert!(matches!(err, RecordStoreError::NonNumericValue { .. }));
    }

    #[test]
    fn numeric_value_rejects_other_types() {
        for value in [json!(true), json!(null), json!([1]), json!({"a": 1})] {
            let err = numeric_value("price", &value).unwrap_err();
            assert!(matches!(err, RecordStoreError::UnsupportedValueType { .. }));
        }
    }
}
