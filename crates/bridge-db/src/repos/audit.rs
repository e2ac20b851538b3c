//! Sync audit log.
//!
//! Append-only: one entry per dispatcher invocation, success or failure.
//! Triggers in the schema reject UPDATE and DELETE on `sync_audit`.

use chrono::Utc;

use bridge_core::entities::SyncAuditEntry;
use bridge_core::enums::{SyncOperation, SyncOutcome};

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime, parse_enum, parse_optional_json, to_json_text};

/// An audit entry before the database assigns its id and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAuditEntry {
    pub operation: SyncOperation,
    pub record_id: String,
    pub old_data: Option<serde_json::Value>,
    pub new_data: Option<serde_json::Value>,
    pub result: SyncOutcome,
    pub error_message: Option<String>,
}

/// Filter criteria for audit queries.
#[derive(Debug, Default, Clone)]
pub struct AuditFilter {
    pub operation: Option<SyncOperation>,
    pub record_id: Option<String>,
    pub result: Option<SyncOutcome>,
    pub limit: Option<u32>,
}

const SELECT_COLUMNS: &str =
    "id, operation, record_id, old_data, new_data, result, error_message, created_at";

fn row_to_entry(row: &libsql::Row) -> Result<SyncAuditEntry, DatabaseError> {
    Ok(SyncAuditEntry {
        id: row.get::<i64>(0)?,
        operation: parse_enum(&row.get::<String>(1)?)?,
        record_id: row.get::<String>(2)?,
        old_data: parse_optional_json(get_opt_string(row, 3)?.as_deref())?,
        new_data: parse_optional_json(get_opt_string(row, 4)?.as_deref())?,
        result: parse_enum(&row.get::<String>(5)?)?,
        error_message: get_opt_string(row, 6)?,
        created_at: parse_datetime(&row.get::<String>(7)?)?,
    })
}

/// Audit log bound to a connection or an open transaction.
#[derive(Clone, Copy)]
pub struct AuditLog<'c> {
    conn: &'c libsql::Connection,
}

impl<'c> AuditLog<'c> {
    #[must_use]
    pub const fn new(conn: &'c libsql::Connection) -> Self {
        Self { conn }
    }

    /// Append an entry and return its id.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the INSERT fails. Callers must treat this
    /// as fatal for the enclosing unit of work.
    pub async fn append(&self, entry: &NewAuditEntry) -> Result<i64, DatabaseError> {
        let old_data = entry.old_data.as_ref().map(to_json_text).transpose()?;
        let new_data = entry.new_data.as_ref().map(to_json_text).transpose()?;
        let mut rows = self
            .conn
            .query(
                "INSERT INTO sync_audit (operation, record_id, old_data, new_data, result, error_message, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 RETURNING id",
                libsql::params![
                    entry.operation.as_str(),
                    entry.record_id.as_str(),
                    old_data,
                    new_data,
                    entry.result.as_str(),
                    entry.error_message.as_deref(),
                    Utc::now().to_rfc3339()
                ],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(row.get::<i64>(0)?)
    }

    /// Entries matching the filter, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn query(&self, filter: &AuditFilter) -> Result<Vec<SyncAuditEntry>, DatabaseError> {
        let mut conditions = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(op) = filter.operation {
            params.push(libsql::Value::Text(op.as_str().to_string()));
            conditions.push(format!("operation = ?{}", params.len()));
        }
        if let Some(ref rid) = filter.record_id {
            params.push(libsql::Value::Text(rid.clone()));
            conditions.push(format!("record_id = ?{}", params.len()));
        }
        if let Some(result) = filter.result {
            params.push(libsql::Value::Text(result.as_str().to_string()));
            conditions.push(format!("result = ?{}", params.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let limit = filter.limit.unwrap_or(100);
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM sync_audit {where_clause} ORDER BY id DESC LIMIT {limit}"
        );

        let mut rows = self
            .conn
            .query(&sql, libsql::params_from_iter(params))
            .await?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(row_to_entry(&row)?);
        }
        Ok(entries)
    }

    /// Records whose most recent attempt failed, oldest first.
    ///
    /// Organization and user ids live in separate namespaces, so "most recent"
    /// is computed per entity family rather than per operation.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn latest_failures(&self) -> Result<Vec<SyncAuditEntry>, DatabaseError> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM sync_audit
             WHERE id IN (
                 SELECT MAX(id) FROM sync_audit
                 GROUP BY CASE WHEN operation IN ('SYNC_ORG', 'DELETE_ORG') THEN 'organization' ELSE 'user' END,
                          record_id
             )
             AND result = 'FAILURE'
             ORDER BY id"
        );
        let mut rows = self.conn.query(&sql, ()).await?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(row_to_entry(&row)?);
        }
        Ok(entries)
    }

    /// Entry counts grouped by operation and outcome.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn counts(&self) -> Result<Vec<(SyncOperation, SyncOutcome, i64)>, DatabaseError> {
        let mut rows = self
            .conn
            .query(
                "SELECT operation, result, COUNT(*) FROM sync_audit GROUP BY operation, result",
                (),
            )
            .await?;
        let mut counts = Vec::new();
        while let Some(row) = rows.next().await? {
            counts.push((
                parse_enum(&row.get::<String>(0)?)?,
                parse_enum(&row.get::<String>(1)?)?,
                row.get::<i64>(2)?,
            ));
        }
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::BridgeDb;

    fn entry(operation: SyncOperation, record_id: &str, result: SyncOutcome) -> NewAuditEntry {
        NewAuditEntry {
            operation,
            record_id: record_id.to_string(),
            old_data: None,
            new_data: None,
            result,
            error_message: (result == SyncOutcome::Failure).then(|| "boom".to_string()),
        }
    }

    #[tokio::test]
    async fn append_assigns_increasing_ids() {
        let db = BridgeDb::open_local(":memory:").await.unwrap();
        let log = AuditLog::new(db.conn());

        let first = log
            .append(&entry(SyncOperation::SyncOrg, "org_a", SyncOutcome::Success))
            .await
            .unwrap();
        let second = log
            .append(&entry(SyncOperation::SyncUser, "alice", SyncOutcome::Success))
            .await
            .unwrap();
        assert!(second > first);
    }

    #[tokio::test]
    async fn old_data_round_trips() {
        let db = BridgeDb::open_local(":memory:").await.unwrap();
        let log = AuditLog::new(db.conn());
        let mut e = entry(SyncOperation::DeleteUser, "charlie", SyncOutcome::Success);
        e.old_data = Some(json!({"id": "charlie", "email": "charlie@techcorp.com"}));
        log.append(&e).await.unwrap();

        let stored = log.query(&AuditFilter::default()).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].old_data.as_ref().unwrap()["email"], "charlie@techcorp.com");
        assert_eq!(stored[0].new_data, None);
    }

    #[tokio::test]
    async fn query_filters_and_orders_newest_first() {
        let db = BridgeDb::open_local(":memory:").await.unwrap();
        let log = AuditLog::new(db.conn());
        log.append(&entry(SyncOperation::SyncUser, "alice", SyncOutcome::Success))
            .await
            .unwrap();
        log.append(&entry(SyncOperation::SyncUser, "bob", SyncOutcome::Failure))
            .await
            .unwrap();
        log.append(&entry(SyncOperation::SyncUser, "alice", SyncOutcome::Failure))
            .await
            .unwrap();

        let alice = log
            .query(&AuditFilter {
                record_id: Some("alice".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(alice.len(), 2);
        assert_eq!(alice[0].result, SyncOutcome::Failure);

        let failures = log
            .query(&AuditFilter {
                result: Some(SyncOutcome::Failure),
                limit: Some(1),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].record_id, "alice");
    }

    #[tokio::test]
    async fn latest_failures_ignores_recovered_records() {
        let db = BridgeDb::open_local(":memory:").await.unwrap();
        let log = AuditLog::new(db.conn());
        log.append(&entry(SyncOperation::SyncUser, "alice", SyncOutcome::Failure))
            .await
            .unwrap();
        log.append(&entry(SyncOperation::SyncUser, "alice", SyncOutcome::Success))
            .await
            .unwrap();
        log.append(&entry(SyncOperation::DeleteUser, "bob", SyncOutcome::Failure))
            .await
            .unwrap();
        // Same id as a user, different family.
        log.append(&entry(SyncOperation::SyncOrg, "alice", SyncOutcome::Failure))
            .await
            .unwrap();

        let pending = log.latest_failures().await.unwrap();
        let keys: Vec<_> = pending
            .iter()
            .map(|e| (e.operation, e.record_id.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![(SyncOperation::DeleteUser, "bob"), (SyncOperation::SyncOrg, "alice")]
        );
    }

    #[tokio::test]
    async fn counts_by_operation_and_result() {
        let db = BridgeDb::open_local(":memory:").await.unwrap();
        let log = AuditLog::new(db.conn());
        log.append(&entry(SyncOperation::SyncOrg, "org_a", SyncOutcome::Success))
            .await
            .unwrap();
        log.append(&entry(SyncOperation::SyncOrg, "org_b", SyncOutcome::Success))
            .await
            .unwrap();
        log.append(&entry(SyncOperation::SyncOrg, "org_c", SyncOutcome::Failure))
            .await
            .unwrap();

        let mut counts = log.counts().await.unwrap();
        counts.sort_by_key(|(_, outcome, _)| outcome.as_str());
        assert_eq!(
            counts,
            vec![
                (SyncOperation::SyncOrg, SyncOutcome::Failure, 1),
                (SyncOperation::SyncOrg, SyncOutcome::Success, 2),
            ]
        );
    }
}
