use serde::Serialize;

use bridge_config::BridgeConfig;
use bridge_db::service::SyncService;

use crate::cli::GlobalFlags;
use crate::output::output;

#[derive(Serialize)]
struct InitResponse {
    source: String,
    target: String,
    target_remote: bool,
    statement_timeout_ms: u64,
}

/// Handle `bridgectl init`.
///
/// Opening the service already ran the embedded migrations; this reports
/// where the databases live.
pub async fn handle(
    service: &SyncService,
    config: &BridgeConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    // Touch the source so a broken file surfaces here rather than on first sync.
    service.sync_status().await?;
    let target = if config.target.is_remote() {
        config.target.url.clone()
    } else {
        config.target.path.clone()
    };
    tracing::info!(source = %config.source.path, %target, "bridge databases ready");
    output(
        &InitResponse {
            source: config.source.path.clone(),
            target,
            target_remote: config.target.is_remote(),
            statement_timeout_ms: config.target.statement_timeout_ms,
        },
        flags.format,
    )
}
