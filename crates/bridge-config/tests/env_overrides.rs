use figment::Jail;

use bridge_config::{BridgeConfig, ConfigError};

#[test]
fn env_vars_fill_nested_sections() {
    Jail::expect_with(|jail| {
        jail.set_env("BRIDGE_TARGET__URL", "libsql://from-env.turso.io");
        jail.set_env("BRIDGE_TARGET__AUTH_TOKEN", "env-token");
        jail.set_env("BRIDGE_TARGET__STATEMENT_TIMEOUT_MS", "1200");

        let config = BridgeConfig::load().expect("config loads");
        assert_eq!(config.target.url, "libsql://from-env.turso.io");
        assert_eq!(config.target.statement_timeout_ms, 1200);
        assert!(config.target.is_remote());
        Ok(())
    });
}

#[test]
fn env_beats_project_file() {
    Jail::expect_with(|jail| {
        jail.create_dir(".bridge")?;
        jail.create_file(".bridge/config.toml", "[source]\npath = \"from-file.db\"\n")?;
        jail.set_env("BRIDGE_SOURCE__PATH", "from-env.db");

        let config = BridgeConfig::load().expect("config loads");
        assert_eq!(config.source.path, "from-env.db");
        Ok(())
    });
}

#[test]
fn url_without_token_is_rejected() {
    Jail::expect_with(|jail| {
        jail.set_env("BRIDGE_TARGET__URL", "libsql://chat-prod.turso.io");

        let err = BridgeConfig::load().expect_err("half-configured remote must fail");
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref field, .. } if field == "target.auth_token"
        ));
        Ok(())
    });
}

#[test]
fn token_without_url_is_rejected() {
    Jail::expect_with(|jail| {
        jail.set_env("BRIDGE_TARGET__AUTH_TOKEN", "stray-token");

        let err = BridgeConfig::load().expect_err("half-configured remote must fail");
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref field, .. } if field == "target.url"
        ));
        Ok(())
    });
}
