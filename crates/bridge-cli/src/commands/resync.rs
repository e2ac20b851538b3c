use bridge_db::service::SyncService;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ResyncCommands;
use crate::output::output;

/// Handle `bridgectl resync`.
pub async fn handle(action: &ResyncCommands, service: &SyncService, flags: &GlobalFlags) -> anyhow::Result<()> {
    let reports = match action {
        ResyncCommands::Org { id } => vec![service.resync_organization(id).await?],
        ResyncCommands::User { id } => vec![service.resync_user(id).await?],
        ResyncCommands::Team { id } => service.resync_team_members(id).await?,
    };
    output(&reports, flags.format)
}
