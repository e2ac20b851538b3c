use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{SourceEntity, TargetEntity};

/// Correspondence between a source entity and its target row.
///
/// Unique on `(source_type, source_id)`. A row exists exactly while the target
/// row it points at exists.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SyncMapping {
    pub source_type: SourceEntity,
    pub source_id: String,
    pub target_type: TargetEntity,
    pub target_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
