use axum::extract::{Extension, Query};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::{DatabaseManager, RecordStore};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// GET /api/data/types - Distinct record types observed for the user
pub async fn record_types(Extension(user): Extension<AuthUser>) -> ApiResult<Vec<String>> {
    let store = RecordStore::new(DatabaseManager::service_pool().await?);
    let types = store.record_types(user.user_id).await?;

    Ok(ApiResponse::success(types))
}

#[derive(Debug, Deserialize)]
pub struct FieldsQuery {
    #[serde(rename = "recordType")]
    pub record_type: Option<String>,
}

/// GET /api/data/fields?recordType=sales - The discovered field catalog for
/// one of the user's record types. Unknown types yield an empty catalog.
pub async fn fields(
    Extension(user): Extension<AuthUser>,
    Query(query): Query<FieldsQuery>,
) -> ApiResult<Value> {
    let record_type = query
        .record_type
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing recordType"))?;

    let store = RecordStore::new(DatabaseManager::service_pool().await?);
    let fields = store.fields(user.user_id, &record_type).await?;

    Ok(ApiResponse::success(json!({
        "recordType": record_type,
        "fields": fields,
    })))
}
