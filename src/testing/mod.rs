//! Test doubles shared by unit tests.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::database::RecordStoreError;
use crate::ingest::RecordSink;

#[derive(Debug, Clone)]
pub struct SunkRecord {
    pub user_id: Uuid,
    pub record_type: String,
    pub data: Value,
}

#[derive(Debug, Clone)]
pub struct SunkQuarantine {
    pub user_id: Uuid,
    pub record_type: String,
    pub data: Value,
    pub reason: String,
}

/// In-memory RecordSink capturing everything the parsers route, so parser
/// behavior is testable without a database.
#[derive(Default)]
pub struct MemorySink {
    valid: Mutex<Vec<SunkRecord>>,
    quarantined: Mutex<Vec<SunkQuarantine>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn valid(&self) -> Vec<SunkRecord> {
        self.valid.lock().unwrap().clone()
    }

    pub fn quarantined(&self) -> Vec<SunkQuarantine> {
        self.quarantined.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecordSink for MemorySink {
    async fn store_valid(
        &self,
        user_id: Uuid,
        record_type: &str,
        data: &Value,
    ) -> Result<(), RecordStoreError> {
        self.valid.lock().unwrap().push(SunkRecord {
            user_id,
            record_type: record_type.to_string(),
            data: data.clone(),
        });
        Ok(())
    }

    async fn store_quarantined(
        &self,
        user_id: Uuid,
        record_type: &str,
        data: &Value,
        reason: &str,
    ) -> Result<(), RecordStoreError> {
        self.quarantined.lock().unwrap().push(SunkQuarantine {
            user_id,
            record_type: record_type.to_string(),
            data: data.clone(),
            reason: reason.to_string(),
        });
        Ok(())
    }
}
