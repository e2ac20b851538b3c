use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::TargetRole;

/// A chat-application user, derived from one source `User`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct TargetUser {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub role: TargetRole,
    /// `max_budget`, `spend`, `models`.
    pub settings: serde_json::Value,
    /// `original_user_id`, `team_id`, `organization_id`, `original_role`, `sso_user_id`.
    pub info: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
