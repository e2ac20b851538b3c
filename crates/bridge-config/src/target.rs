//! Target (chat application) database configuration.

use serde::{Deserialize, Serialize};

fn default_path() -> String {
    "bridge-target.db".to_string()
}

/// Default bound on a single remote statement, in milliseconds.
const fn default_statement_timeout_ms() -> u64 {
    5_000
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TargetConfig {
    /// Local libSQL file used when no remote URL is configured.
    #[serde(default = "default_path")]
    pub path: String,

    /// Remote database URL (e.g., `libsql://chat-prod.turso.io`).
    #[serde(default)]
    pub url: String,

    /// Auth token for the remote database.
    #[serde(default)]
    pub auth_token: String,

    /// Upper bound on one target write; exceeding it is a sync failure.
    #[serde(default = "default_statement_timeout_ms")]
    pub statement_timeout_ms: u64,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            url: String::new(),
            auth_token: String::new(),
            statement_timeout_ms: default_statement_timeout_ms(),
        }
    }
}

impl TargetConfig {
    /// Whether the target is reached over the network instead of a local file.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        !self.url.is_empty() && !self.auth_token.is_empty()
    }

    #[must_use]
    pub const fn statement_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.statement_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_local() {
        let config = TargetConfig::default();
        assert!(!config.is_remote());
        assert_eq!(config.path, "bridge-target.db");
        assert_eq!(config.statement_timeout_ms, 5_000);
    }

    #[test]
    fn remote_needs_url_and_token() {
        let mut config = TargetConfig {
            url: "libsql://chat.turso.io".into(),
            ..Default::default()
        };
        assert!(!config.is_remote());

        config.auth_token = "token".into();
        assert!(config.is_remote());
    }
}
