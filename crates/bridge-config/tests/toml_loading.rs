//! Integration tests for TOML configuration loading.
//!
//! Uses `figment::Jail` for sandboxed files and env vars.

use figment::{
    Figment, Jail,
    providers::{Format, Serialized, Toml},
};
use pretty_assertions::assert_eq;

use bridge_config::{BridgeConfig, ConfigError};

#[test]
fn loads_sections_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[source]
path = "gateway.db"

[target]
url = "libsql://chat.turso.io"
auth_token = "chat-token"
statement_timeout_ms = 750

[general]
default_limit = 10
"#,
        )?;

        let config: BridgeConfig = Figment::from(Serialized::defaults(BridgeConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.source.path, "gateway.db");
        assert_eq!(config.target.url, "libsql://chat.turso.io");
        assert_eq!(config.target.statement_timeout_ms, 750);
        assert_eq!(config.general.default_limit, 10);
        assert!(config.target.is_remote());
        Ok(())
    });
}

#[test]
fn project_file_is_picked_up() {
    Jail::expect_with(|jail| {
        jail.create_dir(".bridge")?;
        jail.create_file(
            ".bridge/config.toml",
            r#"
[target]
path = "chat.db"
"#,
        )?;

        let config = BridgeConfig::load().expect("config loads");
        assert_eq!(config.target.path, "chat.db");
        assert_eq!(config.source.path, "bridge-source.db");
        Ok(())
    });
}

#[test]
fn explicit_file_overrides_defaults() {
    Jail::expect_with(|jail| {
        jail.create_file("custom.toml", "[source]\npath = \"custom-source.db\"\n")?;

        let config = BridgeConfig::load_from(std::path::Path::new("custom.toml"))
            .expect("config loads");
        assert_eq!(config.source.path, "custom-source.db");
        Ok(())
    });
}

#[test]
fn zero_timeout_fails_validation() {
    Jail::expect_with(|jail| {
        jail.create_file("custom.toml", "[target]\nstatement_timeout_ms = 0\n")?;

        let result = BridgeConfig::load_from(std::path::Path::new("custom.toml"));
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
        Ok(())
    });
}

#[test]
fn loads_absolute_path_outside_project() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("bridge.toml");
    std::fs::write(
        &path,
        "[target]\npath = \"outside.db\"\nstatement_timeout_ms = 1200\n",
    )
    .expect("write config");

    Jail::expect_with(|_jail| {
        let config = BridgeConfig::load_from(&path).expect("config loads");
        assert_eq!(config.target.path, "outside.db");
        assert_eq!(
            config.target.statement_timeout(),
            std::time::Duration::from_millis(1200)
        );
        assert!(!config.target.is_remote());
        Ok(())
    });
}
