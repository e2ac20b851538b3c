use schemars::schema_for;

use bridge_core::entities::{SyncAuditEntry, SyncMapping};
use bridge_db::dispatcher::SyncReport;
use bridge_db::reconcile::DriftReport;
use bridge_db::repos::status::SyncStatus;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::{SchemaArgs, SchemaType};
use crate::output::output;

/// Handle `bridgectl schema`. Needs no database.
pub fn handle(args: &SchemaArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let schema = match args.type_name {
        SchemaType::AuditEntry => schema_for!(SyncAuditEntry),
        SchemaType::Mapping => schema_for!(SyncMapping),
        SchemaType::SyncReport => schema_for!(SyncReport),
        SchemaType::SyncStatus => schema_for!(SyncStatus),
        SchemaType::DriftReport => schema_for!(DriftReport),
    };
    output(&schema, flags.format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audit_entry_schema_names_outcome_values() {
        let schema = serde_json::to_value(schema_for!(SyncAuditEntry)).unwrap();
        let text = schema.to_string();
        assert!(text.contains("SUCCESS"));
        assert!(text.contains("DELETE_USER"));
    }
}
