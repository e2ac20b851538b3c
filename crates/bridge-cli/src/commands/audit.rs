use bridge_core::entities::SyncAuditEntry;
use bridge_core::enums::{SyncOperation, SyncOutcome};
use bridge_db::repos::audit::AuditFilter;
use bridge_db::service::SyncService;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::AuditArgs;
use crate::commands::shared::limit::effective_limit;
use crate::commands::shared::parse::parse_enum;
use crate::output::output;

/// Handle `bridgectl audit`.
pub async fn handle(args: &AuditArgs, service: &SyncService, flags: &GlobalFlags) -> anyhow::Result<()> {
    let entries = fetch(args, service, flags).await?;
    output(&entries, flags.format)
}

pub async fn fetch(
    args: &AuditArgs,
    service: &SyncService,
    flags: &GlobalFlags,
) -> anyhow::Result<Vec<SyncAuditEntry>> {
    let filter = AuditFilter {
        operation: args
            .operation
            .as_deref()
            .map(|value| parse_enum::<SyncOperation>(value, "operation"))
            .transpose()?,
        record_id: args.record_id.clone(),
        result: args
            .result
            .as_deref()
            .map(|value| parse_enum::<SyncOutcome>(value, "result"))
            .transpose()?,
        limit: Some(effective_limit(flags.limit, service.default_limit())),
    };

    service.query_audit(&filter).await.map_err(Into::into)
}
