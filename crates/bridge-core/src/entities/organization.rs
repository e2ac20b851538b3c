use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A gateway organization. Synchronized one-to-one into a target `Group`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Organization {
    pub id: String,
    pub alias: Option<String>,
    pub budget_id: Option<String>,
    #[serde(default)]
    pub models: Vec<String>,
    #[serde(default)]
    pub spend: f64,
    #[serde(default = "super::empty_object")]
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
}

impl Organization {
    /// A fresh organization with zero spend and no models.
    #[must_use]
    pub fn new(id: impl Into<String>, alias: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            alias: Some(alias.into()),
            budget_id: None,
            models: Vec::new(),
            spend: 0.0,
            metadata: super::empty_object(),
            created_at: now,
            updated_at: now,
            created_by: None,
            updated_by: None,
        }
    }
}
