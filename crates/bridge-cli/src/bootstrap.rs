use std::path::PathBuf;

use anyhow::Context;

use bridge_config::BridgeConfig;

use crate::cli::GlobalFlags;

/// Load configuration, honoring `--config` and a `.env` in the working directory.
pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<BridgeConfig> {
    match &flags.config {
        Some(path) => {
            load_dotenv_beside(path)?;
            BridgeConfig::load_from(path)
                .with_context(|| format!("failed to load config from {}", path.display()))
        }
        None => BridgeConfig::load_with_dotenv().context("failed to load bridge configuration"),
    }
}

fn load_dotenv_beside(config_path: &std::path::Path) -> anyhow::Result<()> {
    let env_path = config_path
        .parent()
        .map_or_else(|| PathBuf::from(".env"), |dir| dir.join(".env"));
    if env_path.exists() {
        dotenvy::from_path(&env_path)
            .with_context(|| format!("failed to load dotenv file at {}", env_path.display()))?;
    }
    Ok(())
}
