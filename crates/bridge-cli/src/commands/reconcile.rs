use serde::Serialize;

use bridge_db::dispatcher::SyncReport;
use bridge_db::reconcile::DriftReport;
use bridge_db::service::SyncService;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ReconcileArgs;
use crate::output::output;

#[derive(Serialize)]
struct ReplayResponse {
    replayed: Vec<SyncReport>,
    remaining: DriftReport,
}

/// Handle `bridgectl reconcile`.
pub async fn handle(args: &ReconcileArgs, service: &SyncService, flags: &GlobalFlags) -> anyhow::Result<()> {
    if !args.replay {
        let drift = service.drift_report().await?;
        if !drift.is_clean() {
            tracing::warn!(
                unmapped = drift.unmapped.len(),
                stale = drift.stale_mappings.len(),
                dangling = drift.dangling.len(),
                failures = drift.pending_failures.len(),
                "source and target have drifted"
            );
        }
        return output(&drift, flags.format);
    }

    let replayed = service.replay_failures().await?;
    let still_failing = replayed.iter().filter(|r| !r.succeeded()).count();
    if still_failing > 0 {
        tracing::warn!(still_failing, "some replays failed again");
    }
    let remaining = service.drift_report().await?;
    output(&ReplayResponse { replayed, remaining }, flags.format)
}
