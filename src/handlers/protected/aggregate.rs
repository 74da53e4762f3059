use axum::extract::{Extension, Query};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::aggregate::{self, AggregateOp};
use crate::database::{DatabaseManager, RecordStore};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

#[derive(Debug, Deserialize)]
pub struct AggregateQuery {
    #[serde(rename = "recordType")]
    pub record_type: Option<String>,
    pub field: Option<String>,
    pub op: Option<String>,
}

/// GET /api/data/aggregate?recordType=sales&field=price&op=sum
///
/// Runs one of the fixed reductions over the numeric values found at a
/// discovered field path across the user's records of the given type.
pub async fn aggregate(
    Extension(user): Extension<AuthUser>,
    Query(query): Query<AggregateQuery>,
) -> ApiResult<Value> {
    let (record_type, field, op) = match (query.record_type, query.field, query.op) {
        (Some(r), Some(f), Some(o))
            if !r.trim().is_empty() && !f.trim().is_empty() && !o.trim().is_empty() =>
        {
            (r, f, o)
        }
        _ => return Err(ApiError::bad_request("Missing recordType/field/op")),
    };

    let op: AggregateOp = op
        .parse()
        .map_err(|e: aggregate::InvalidOperation| ApiError::bad_request(e.to_string()))?;

    let store = RecordStore::new(DatabaseManager::service_pool().await?);
    let values = store
        .numeric_values(user.user_id, &record_type, &field)
        .await?;

    let result = aggregate::reduce(op, &values);

    Ok(ApiResponse::success(json!({
        "recordType": record_type,
        "field": field,
        "op": op.to_string(),
        "count": values.len(),
        "result": result,
    })))
}
