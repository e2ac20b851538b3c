use bridge_db::service::SyncService;

use crate::cli::{GlobalFlags, OutputFormat};
use crate::output::output;

/// Handle `bridgectl status`.
///
/// Tables get the flat metric/value list; JSON gets the structured report.
pub async fn handle(service: &SyncService, flags: &GlobalFlags) -> anyhow::Result<()> {
    let status = service.sync_status().await?;
    match flags.format {
        OutputFormat::Table => output(&status.metrics(), flags.format),
        OutputFormat::Json | OutputFormat::Raw => output(&status, flags.format),
    }
}
