//! Source (gateway) database configuration.

use serde::{Deserialize, Serialize};

fn default_path() -> String {
    "bridge-source.db".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    /// libSQL database file holding organizations, teams, users, the mapping
    /// store, and the audit log. `:memory:` is accepted for tests.
    #[serde(default = "default_path")]
    pub path: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
        }
    }
}

impl SourceConfig {
    #[must_use]
    pub fn is_in_memory(&self) -> bool {
        self.path == ":memory:"
    }
}
