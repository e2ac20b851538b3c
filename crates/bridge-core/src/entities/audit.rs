use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{SyncOperation, SyncOutcome};

/// One sync attempt, win or lose. Never updated after insertion.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct SyncAuditEntry {
    pub id: i64,
    pub operation: SyncOperation,
    /// Source id of the affected record.
    pub record_id: String,
    /// Source row before the mutation (updates and deletes).
    pub old_data: Option<serde_json::Value>,
    /// Source row after the mutation (inserts and updates).
    pub new_data: Option<serde_json::Value>,
    pub result: SyncOutcome,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl SyncAuditEntry {
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.result == SyncOutcome::Success
    }
}
