use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::UserRole;

/// A gateway user. Synchronized one-to-one into a `TargetUser`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct User {
    pub id: String,
    pub alias: Option<String>,
    pub team_id: Option<String>,
    pub organization_id: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub role: UserRole,
    pub sso_user_id: Option<String>,
    #[serde(default)]
    pub teams: Vec<String>,
    pub max_budget: Option<f64>,
    #[serde(default)]
    pub spend: f64,
    #[serde(default)]
    pub models: Vec<String>,
    #[serde(default = "super::empty_object")]
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// A fresh `internal_user` with no team, organization, or budget.
    #[must_use]
    pub fn new(id: impl Into<String>, alias: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            alias: Some(alias.into()),
            team_id: None,
            organization_id: None,
            email: None,
            role: UserRole::default(),
            sso_user_id: None,
            teams: Vec::new(),
            max_budget: None,
            spend: 0.0,
            models: Vec::new(),
            metadata: super::empty_object(),
            created_at: now,
            updated_at: now,
        }
    }
}
