use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

/// Listing projection for user data queries: the record payload plus its tag
/// and timestamp. `data` keeps whatever shape the upload carried; only the
/// envelope columns are fixed.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserRecord {
    pub record_type: String,
    pub data: Value,
    pub stored_at: DateTime<Utc>,
}
