use axum::extract::{Extension, Multipart};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use crate::config;
use crate::database::{DatabaseManager, RecordStore};
use crate::error::ApiError;
use crate::ingest;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// POST /api/data/upload - Ingest a CSV or JSON file
///
/// Multipart form fields:
/// - `datafile`: the file; its filename picks the parser
/// - `recordType`: tag partitioning the user's records
pub async fn upload(
    Extension(user): Extension<AuthUser>,
    mut multipart: Multipart,
) -> ApiResult<Value> {
    let mut filename: Option<String> = None;
    let mut file_bytes: Option<Vec<u8>> = None;
    let mut record_type: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Could not parse multipart form: {}", e)))?
    {
        let field_name = field.name().map(|n| n.to_string());
        match field_name.as_deref() {
            Some("datafile") => {
                filename = field.file_name().map(|n| n.to_string());
                file_bytes = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {}", e)))?
                        .to_vec(),
                );
            }
            Some("recordType") => {
                record_type = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::bad_request(format!("Failed to read recordType: {}", e)))?,
                );
            }
            _ => {} // ignore unknown fields
        }
    }

    let bytes = file_bytes.ok_or_else(|| ApiError::bad_request("No file uploaded"))?;
    let filename = filename.unwrap_or_default();
    let record_type = record_type
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing recordType"))?;

    let max_bytes = config::config().api.max_request_size_bytes;
    if bytes.len() > max_bytes {
        return Err(ApiError::payload_too_large(format!(
            "Upload exceeds {} bytes",
            max_bytes
        )));
    }

    let parser = ingest::parser_for(&filename)
        .ok_or_else(|| ApiError::bad_request("Unsupported file type. Upload CSV or JSON."))?;

    let digest = format!("{:x}", Sha256::digest(&bytes));

    let store = RecordStore::new(DatabaseManager::service_pool().await?);
    let report = parser
        .parse(&store, user.user_id, &record_type, &bytes)
        .await?;

    tracing::info!(
        username = %user.username,
        record_type = %record_type,
        inserted = report.inserted,
        quarantined = report.quarantined,
        sha256 = %digest,
        "processed upload"
    );

    Ok(ApiResponse::success(json!({
        "message": report.message(),
        "inserted": report.inserted,
        "quarantined": report.quarantined,
        "sha256": digest,
    })))
}
