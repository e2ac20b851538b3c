use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A chat-application group, derived from one `Organization`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Group {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Carries `organization_id`, `spend`, `models`, `budget_id`, `metadata`.
    pub meta: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
