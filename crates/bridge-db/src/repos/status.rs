//! Read-only status report over the source database.
//!
//! Counts source entities, mappings by target type, and audit entries by
//! operation and outcome. Never touches the target.

use schemars::JsonSchema;
use serde::Serialize;

use bridge_core::enums::{SyncOperation, SyncOutcome, TargetEntity};

use crate::error::DatabaseError;
use crate::repos::audit::AuditLog;
use crate::repos::mapping::MappingStore;

/// Audit totals for one operation tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
pub struct OperationStats {
    pub operation: SyncOperation,
    pub total: i64,
    pub success: i64,
    pub failure: i64,
}

/// One `metric = value` line of the status report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct StatusMetric {
    pub metric: String,
    pub value: String,
}

impl StatusMetric {
    fn new(metric: impl Into<String>, value: impl ToString) -> Self {
        Self {
            metric: metric.into(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct SyncStatus {
    pub organizations: i64,
    pub teams: i64,
    pub users: i64,
    pub mapped_groups: i64,
    pub mapped_users: i64,
    /// One row per operation tag, zeros included.
    pub operations: Vec<OperationStats>,
}

async fn count(conn: &libsql::Connection, table: &str) -> Result<i64, DatabaseError> {
    let mut rows = conn.query(&format!("SELECT COUNT(*) FROM {table}"), ()).await?;
    let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
    Ok(row.get::<i64>(0)?)
}

impl SyncStatus {
    /// Gather every count from the source database.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if any query fails.
    pub async fn collect(conn: &libsql::Connection) -> Result<Self, DatabaseError> {
        let mut status = Self {
            organizations: count(conn, "organizations").await?,
            teams: count(conn, "teams").await?,
            users: count(conn, "users").await?,
            mapped_groups: 0,
            mapped_users: 0,
            operations: SyncOperation::ALL
                .iter()
                .map(|&operation| OperationStats {
                    operation,
                    total: 0,
                    success: 0,
                    failure: 0,
                })
                .collect(),
        };

        for (target_type, n) in MappingStore::new(conn).count_by_type().await? {
            match target_type {
                TargetEntity::Group => status.mapped_groups = n,
                TargetEntity::User => status.mapped_users = n,
            }
        }

        for (operation, outcome, n) in AuditLog::new(conn).counts().await? {
            if let Some(stats) = status.operations.iter_mut().find(|s| s.operation == operation) {
                stats.total += n;
                match outcome {
                    SyncOutcome::Success => stats.success += n,
                    SyncOutcome::Failure => stats.failure += n,
                }
            }
        }

        Ok(status)
    }

    #[must_use]
    pub fn audit_total(&self) -> i64 {
        self.operations.iter().map(|s| s.total).sum()
    }

    #[must_use]
    pub fn audit_failures(&self) -> i64 {
        self.operations.iter().map(|s| s.failure).sum()
    }

    /// Share of successful attempts in percent, `None` before the first attempt.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn success_rate(&self) -> Option<f64> {
        let total = self.audit_total();
        (total > 0).then(|| (total - self.audit_failures()) as f64 * 100.0 / total as f64)
    }

    /// Flatten into metric/value pairs for tabular output.
    #[must_use]
    pub fn metrics(&self) -> Vec<StatusMetric> {
        let mut metrics = vec![
            StatusMetric::new("source_organizations", self.organizations),
            StatusMetric::new("source_teams", self.teams),
            StatusMetric::new("source_users", self.users),
            StatusMetric::new("mapped_groups", self.mapped_groups),
            StatusMetric::new("mapped_users", self.mapped_users),
            StatusMetric::new("audit_entries", self.audit_total()),
            StatusMetric::new("audit_failures", self.audit_failures()),
        ];
        for stats in &self.operations {
            let op = stats.operation.as_str().to_lowercase();
            metrics.push(StatusMetric::new(format!("{op}_success"), stats.success));
            metrics.push(StatusMetric::new(format!("{op}_failure"), stats.failure));
        }
        metrics.push(StatusMetric::new(
            "success_rate",
            self.success_rate()
                .map_or_else(|| "n/a".to_string(), |rate| format!("{rate:.1}%")),
        ));
        metrics
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use bridge_core::entities::{Organization, Team, User};

    use crate::test_support::helpers::{test_service, test_service_with_writer, FailingWriter};

    use super::*;

    #[tokio::test]
    async fn empty_database_reports_zeros() {
        let (svc, _target) = test_service().await;
        let status = svc.sync_status().await.unwrap();

        assert_eq!(status.organizations, 0);
        assert_eq!(status.operations.len(), 4);
        assert_eq!(status.success_rate(), None);
        let rate = status.metrics().into_iter().find(|m| m.metric == "success_rate").unwrap();
        assert_eq!(rate.value, "n/a");
    }

    #[tokio::test]
    async fn counts_reflect_activity() {
        let (svc, _target) = test_service().await;
        svc.create_organization(&Organization::new("org_a", "A")).await.unwrap();
        svc.create_team(&Team::new("team_a", "Team A", "org_a")).await.unwrap();
        svc.create_user(&User::new("u1", "One")).await.unwrap();
        svc.create_user(&User::new("u2", "Two")).await.unwrap();
        svc.delete_user("u2").await.unwrap();

        let status = svc.sync_status().await.unwrap();
        assert_eq!((status.organizations, status.teams, status.users), (1, 1, 1));
        assert_eq!((status.mapped_groups, status.mapped_users), (1, 1));
        assert_eq!(status.audit_total(), 4);

        let sync_user = status
            .operations
            .iter()
            .find(|s| s.operation == SyncOperation::SyncUser)
            .unwrap();
        assert_eq!((sync_user.total, sync_user.success), (2, 2));
        assert_eq!(status.success_rate(), Some(100.0));
    }

    #[tokio::test]
    async fn failures_lower_the_success_rate() {
        let (failing, _) = test_service_with_writer(FailingWriter::unreachable()).await;
        failing.create_organization(&Organization::new("org_b", "B")).await.unwrap();
        let status = failing.sync_status().await.unwrap();

        assert_eq!(status.organizations, 1);
        assert_eq!(status.mapped_groups, 0);
        assert_eq!(status.audit_failures(), 1);
        assert_eq!(status.success_rate(), Some(0.0));
        let metric = status
            .metrics()
            .into_iter()
            .find(|m| m.metric == "sync_org_failure")
            .unwrap();
        assert_eq!(metric.value, "1");
    }
}
