//! On-demand reconciliation.
//!
//! The source and target writes are not atomic, so the two sides can drift
//! (target unreachable, process killed between writes, manual edits on the
//! target). [`SyncService::drift_report`] finds the drift;
//! [`SyncService::replay_failures`] re-runs the attempts whose latest audit
//! entry is a FAILURE.

use schemars::JsonSchema;
use serde::Serialize;

use bridge_core::entities::{Organization, SyncAuditEntry, User};
use bridge_core::enums::{SourceEntity, SyncOperation};

use crate::dispatcher::SyncReport;
use crate::error::DatabaseError;
use crate::helpers::source_entity_to_table;
use crate::repos::audit::AuditLog;
use crate::repos::mapping::MappingStore;
use crate::repos::{organization, user};
use crate::service::SyncService;

/// A source entity or mapping row that disagrees with the other side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct DriftItem {
    pub source_type: SourceEntity,
    pub source_id: String,
    pub target_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, JsonSchema)]
pub struct DriftReport {
    /// Source entities that have never been synced successfully.
    pub unmapped: Vec<DriftItem>,
    /// Mappings whose source entity no longer exists.
    pub stale_mappings: Vec<DriftItem>,
    /// Mappings whose target row is missing.
    pub dangling: Vec<DriftItem>,
    /// Latest audit entry per record, where that entry is a FAILURE.
    pub pending_failures: Vec<SyncAuditEntry>,
    /// Set when the target could not be probed; `dangling` is then incomplete.
    pub probe_error: Option<String>,
}

impl DriftReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.unmapped.is_empty()
            && self.stale_mappings.is_empty()
            && self.dangling.is_empty()
            && self.pending_failures.is_empty()
            && self.probe_error.is_none()
    }
}

async fn unmapped(
    conn: &libsql::Connection,
    source_type: SourceEntity,
) -> Result<Vec<DriftItem>, DatabaseError> {
    let table = source_entity_to_table(source_type);
    let mut rows = conn
        .query(
            &format!(
                "SELECT s.id FROM {table} s
                 LEFT JOIN sync_mapping m ON m.source_type = ?1 AND m.source_id = s.id
                 WHERE m.source_id IS NULL
                 ORDER BY s.id"
            ),
            [source_type.as_str()],
        )
        .await?;
    let mut items = Vec::new();
    while let Some(row) = rows.next().await? {
        items.push(DriftItem {
            source_type,
            source_id: row.get::<String>(0)?,
            target_id: None,
        });
    }
    Ok(items)
}

async fn source_exists(
    conn: &libsql::Connection,
    source_type: SourceEntity,
    id: &str,
) -> Result<bool, DatabaseError> {
    let table = source_entity_to_table(source_type);
    let mut rows = conn
        .query(&format!("SELECT 1 FROM {table} WHERE id = ?1"), [id])
        .await?;
    Ok(rows.next().await?.is_some())
}

/// Prior state carried by a failed entry, for replaying deletes.
fn audited_state<T: serde::de::DeserializeOwned>(entry: &SyncAuditEntry) -> Option<T> {
    entry
        .old_data
        .as_ref()
        .or(entry.new_data.as_ref())
        .and_then(|value| serde_json::from_value(value.clone()).ok())
}

impl SyncService {
    /// Compare source, mappings and target.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if a source query fails. Target probe failures
    /// are reported in [`DriftReport::probe_error`].
    pub async fn drift_report(&self) -> Result<DriftReport, DatabaseError> {
        let conn = self.db().conn();
        let mut report = DriftReport::default();

        for source_type in [SourceEntity::Organization, SourceEntity::User] {
            report.unmapped.extend(unmapped(conn, source_type).await?);
        }

        for mapping in MappingStore::new(conn).list(None).await? {
            let item = DriftItem {
                source_type: mapping.source_type,
                source_id: mapping.source_id.clone(),
                target_id: Some(mapping.target_id.clone()),
            };
            if !source_exists(conn, mapping.source_type, &mapping.source_id).await? {
                report.stale_mappings.push(item);
                continue;
            }
            if report.probe_error.is_some() {
                continue;
            }
            match self.executor().exists(mapping.target_type, &mapping.target_id).await {
                Ok(true) => {}
                Ok(false) => report.dangling.push(item),
                Err(e) => {
                    tracing::warn!(error = %e, "target probe failed; skipping remaining probes");
                    report.probe_error = Some(e.to_string());
                }
            }
        }

        report.pending_failures = AuditLog::new(conn).latest_failures().await?;
        Ok(report)
    }

    /// Re-run every attempt whose latest audit entry is a FAILURE.
    ///
    /// A record whose source still exists is resynced; otherwise the delete is
    /// replayed with the prior state captured in the failed entry.
    ///
    /// # Errors
    ///
    /// Returns the first source database failure.
    pub async fn replay_failures(&self) -> Result<Vec<SyncReport>, DatabaseError> {
        let failures = AuditLog::new(self.db().conn()).latest_failures().await?;
        let mut reports = Vec::with_capacity(failures.len());
        for entry in failures {
            if let Some(report) = self.replay_one(&entry).await? {
                reports.push(report);
            }
        }
        Ok(reports)
    }

    async fn replay_one(&self, entry: &SyncAuditEntry) -> Result<Option<SyncReport>, DatabaseError> {
        let source_type = entry.operation.source_entity();
        let (_gate, tx) = self.begin().await?;
        let result = async {
            let id = entry.record_id.as_str();
            match entry.operation {
                SyncOperation::SyncOrg | SyncOperation::DeleteOrg => {
                    if let Some(org) = organization::find(&tx, id).await? {
                        return self.handlers().organization.on_insert(&tx, &org).await.map(Some);
                    }
                    match audited_state::<Organization>(entry) {
                        Some(org) => self.handlers().organization.on_delete(&tx, &org).await.map(Some),
                        None => Ok(None),
                    }
                }
                SyncOperation::SyncUser | SyncOperation::DeleteUser => {
                    if let Some(user) = user::find(&tx, id).await? {
                        return self.handlers().user.on_insert(&tx, &user).await.map(Some);
                    }
                    match audited_state::<User>(entry) {
                        Some(user) => self.handlers().user.on_delete(&tx, &user).await.map(Some),
                        None => Ok(None),
                    }
                }
            }
        }
        .await;
        if matches!(result, Ok(None)) {
            tracing::warn!(
                operation = %entry.operation,
                record_id = %entry.record_id,
                source_type = %source_type,
                "no source row or audited state; cannot replay"
            );
        }
        Self::finish(tx, result).await
    }
}
