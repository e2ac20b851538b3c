//! # bridge-config
//!
//! Layered configuration loading for the bridge sync engine using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`BRIDGE_*` prefix, `__` as separator)
//! 2. Project-level `.bridge/config.toml`
//! 3. User-level `~/.config/bridge/config.toml`
//! 4. Built-in defaults
//!
//! Figment maps `BRIDGE_TARGET__URL` -> `target.url`,
//! `BRIDGE_SOURCE__PATH` -> `source.path`, and so on.
//!
//! # Usage
//!
//! ```no_run
//! use bridge_config::BridgeConfig;
//!
//! let config = BridgeConfig::load_with_dotenv().expect("config");
//! if config.target.is_remote() {
//!     println!("target: {}", config.target.url);
//! }
//! ```

mod error;
mod general;
mod source;
mod target;

pub use error::ConfigError;
pub use general::GeneralConfig;
pub use source::SourceConfig;
pub use target::TargetConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BridgeConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub target: TargetConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl BridgeConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` support.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if extraction fails or a value is out of range.
    pub fn load() -> Result<Self, ConfigError> {
        Self::extract(&Self::figment())
    }

    /// Load configuration after reading `.env` from the current directory.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if extraction fails or a value is out of range.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Load configuration with an explicit project file merged above the
    /// default locations (used by `bridgectl --config`).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if extraction fails or a value is out of range.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let figment = Self::figment()
            .merge(Toml::file(path))
            .merge(Env::prefixed("BRIDGE_").split("__"));
        Self::extract(&figment)
    }

    /// Build the figment provider chain.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(".bridge/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("BRIDGE_").split("__"))
    }

    /// Extract and validate a config from an arbitrary figment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if extraction fails or a value is out of range.
    pub fn extract(figment: &Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot run with.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target.statement_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "target.statement_timeout_ms".into(),
                reason: "must be greater than zero".into(),
            });
        }
        if self.source.path.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "source.path".into(),
                reason: "must not be empty".into(),
            });
        }
        match (self.target.url.is_empty(), self.target.auth_token.is_empty()) {
            (false, true) => {
                return Err(ConfigError::InvalidValue {
                    field: "target.auth_token".into(),
                    reason: "must be set together with target.url".into(),
                });
            }
            (true, false) => {
                return Err(ConfigError::InvalidValue {
                    field: "target.url".into(),
                    reason: "must be set together with target.auth_token".into(),
                });
            }
            _ => {}
        }
        if !self.target.is_remote() && self.target.path.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "target.path".into(),
                reason: "must be set when no remote url is configured".into(),
            });
        }
        Ok(())
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("bridge").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = BridgeConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.target.is_remote());
        assert!(!config.source.is_in_memory());
        assert_eq!(config.general.default_limit, 50);
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut config = BridgeConfig::default();
        config.target.statement_timeout_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "target.statement_timeout_ms"));
    }
}
