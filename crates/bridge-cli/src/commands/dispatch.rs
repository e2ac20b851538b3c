use bridge_config::BridgeConfig;
use bridge_db::service::SyncService;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(
    command: Commands,
    service: &SyncService,
    config: &BridgeConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match command {
        Commands::Init => commands::init::handle(service, config, flags).await,
        Commands::Status => commands::status::handle(service, flags).await,
        Commands::Audit(args) => commands::audit::handle(&args, service, flags).await,
        Commands::Reconcile(args) => commands::reconcile::handle(&args, service, flags).await,
        Commands::Resync { action } => commands::resync::handle(&action, service, flags).await,
        Commands::Schema(args) => commands::schema::handle(&args, flags),
    }
}
