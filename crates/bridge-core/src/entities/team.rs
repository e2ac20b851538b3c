use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A gateway team.
///
/// Teams are never synchronized on their own; a team's alias only prefixes
/// the display names of its members.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Team {
    pub id: String,
    pub alias: Option<String>,
    pub organization_id: String,
    #[serde(default)]
    pub members: Vec<String>,
    pub max_budget: Option<f64>,
    #[serde(default)]
    pub spend: f64,
    #[serde(default)]
    pub models: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Team {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        alias: impl Into<String>,
        organization_id: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            alias: Some(alias.into()),
            organization_id: organization_id.into(),
            members: Vec::new(),
            max_budget: None,
            spend: 0.0,
            models: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// The alias if it is usable as a name prefix.
    #[must_use]
    pub fn known_alias(&self) -> Option<&str> {
        self.alias.as_deref().filter(|alias| !alias.is_empty())
    }
}
