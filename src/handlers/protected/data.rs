use axum::extract::{Extension, Query};
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Deserialize;

use crate::database::models::UserRecord;
use crate::database::{DatabaseManager, RecordStore};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

#[derive(Debug, Deserialize)]
pub struct UserDataQuery {
    /// Inclusive lower bound on the storage date (YYYY-MM-DD)
    pub from: Option<String>,
    /// Inclusive upper bound; compared at midnight, matching `from`
    pub to: Option<String>,
}

/// GET /api/data - List the authenticated user's records, optionally
/// bounded by a storage-date range.
pub async fn user_data(
    Extension(user): Extension<AuthUser>,
    Query(query): Query<UserDataQuery>,
) -> ApiResult<Vec<UserRecord>> {
    let from = parse_date_param("from", query.from.as_deref())?;
    let to = parse_date_param("to", query.to.as_deref())?;

    let store = RecordStore::new(DatabaseManager::service_pool().await?);
    let records = store.user_data(user.user_id, from, to).await?;

    Ok(ApiResponse::success(records))
}

fn parse_date_param(
    name: &str,
    raw: Option<&str>,
) -> Result<Option<DateTime<Utc>>, ApiError> {
    raw.map(|value| {
        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(|date| Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)))
            .map_err(|_| {
                ApiError::bad_request(format!("Invalid '{}' date format. Use YYYY-MM-DD", name))
            })
    })
    .transpose()
}
