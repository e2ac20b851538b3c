//! Target write surface.
//!
//! The dispatcher never talks to the target database directly. It hands a
//! [`TargetStatement`] to a [`RemoteWriter`]; the shipped implementation,
//! [`LibsqlRemoteWriter`], applies it to a second libSQL database.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use tokio::sync::Mutex;

use bridge_core::enums::TargetEntity;
use bridge_core::statement::{GroupRow, TargetStatement, TargetUserRow};

use crate::helpers::to_json_text;
use crate::target::TargetDb;

/// A target write that did not happen.
///
/// These are values, not faults: the dispatcher turns each one into a FAILURE
/// audit entry and the source mutation still commits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// The target could not be reached or refused the connection.
    #[error("target unreachable: {0}")]
    Unreachable(String),

    /// The statement violated a target constraint (unique email, check).
    #[error("target constraint violated: {0}")]
    Constraint(String),

    /// Any other statement failure reported by the target.
    #[error("target statement failed: {0}")]
    Statement(String),

    /// The statement did not complete within the configured timeout.
    #[error("target statement timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },
}

impl From<libsql::Error> for RemoteError {
    fn from(e: libsql::Error) -> Self {
        let msg = e.to_string();
        let lower = msg.to_lowercase();
        if lower.contains("constraint") {
            Self::Constraint(msg)
        } else if lower.contains("connect") || lower.contains("hrana") {
            Self::Unreachable(msg)
        } else {
            Self::Statement(msg)
        }
    }
}

impl From<serde_json::Error> for RemoteError {
    fn from(e: serde_json::Error) -> Self {
        Self::Statement(format!("payload serialization: {e}"))
    }
}

impl From<crate::error::DatabaseError> for RemoteError {
    fn from(e: crate::error::DatabaseError) -> Self {
        Self::Statement(e.to_string())
    }
}

/// Applies target statements and probes target rows.
#[async_trait]
pub trait RemoteWriter: Send + Sync {
    /// Apply one statement atomically. Returns the number of affected rows.
    async fn apply(&self, statement: &TargetStatement) -> Result<u64, RemoteError>;

    /// Whether a target row exists.
    async fn exists(&self, target_type: TargetEntity, target_id: &str) -> Result<bool, RemoteError>;
}

/// [`RemoteWriter`] over a libSQL target database.
///
/// Each statement runs in its own target transaction. A single connection is
/// shared, so statements are serialized through an internal lock.
pub struct LibsqlRemoteWriter {
    target: Arc<TargetDb>,
    lock: Mutex<()>,
}

impl LibsqlRemoteWriter {
    #[must_use]
    pub fn new(target: Arc<TargetDb>) -> Self {
        Self {
            target,
            lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn target(&self) -> &Arc<TargetDb> {
        &self.target
    }

    async fn upsert_group(conn: &libsql::Connection, row: &GroupRow) -> Result<u64, RemoteError> {
        let now = Utc::now().to_rfc3339();
        let affected = conn
            .execute(
                r#"INSERT INTO "group" (id, name, description, meta, created_at, updated_at)
                   VALUES (?1, ?2, ?3, ?4, ?5, ?5)
                   ON CONFLICT(id) DO UPDATE SET
                       name = excluded.name,
                       description = excluded.description,
                       meta = excluded.meta,
                       updated_at = excluded.updated_at"#,
                libsql::params![
                    row.id.as_str(),
                    row.name.as_str(),
                    row.description.as_str(),
                    to_json_text(&row.meta)?,
                    now
                ],
            )
            .await?;
        Ok(affected)
    }

    async fn upsert_user(conn: &libsql::Connection, row: &TargetUserRow) -> Result<u64, RemoteError> {
        let now = Utc::now().to_rfc3339();
        let affected = conn
            .execute(
                r#"INSERT INTO "user" (id, name, email, role, settings, info, created_at, updated_at)
                   VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
                   ON CONFLICT(id) DO UPDATE SET
                       name = excluded.name,
                       email = excluded.email,
                       role = excluded.role,
                       settings = excluded.settings,
                       info = excluded.info,
                       updated_at = excluded.updated_at"#,
                libsql::params![
                    row.id.as_str(),
                    row.name.as_str(),
                    row.email.as_deref(),
                    row.role.as_str(),
                    to_json_text(&row.settings)?,
                    to_json_text(&row.info)?,
                    now
                ],
            )
            .await?;
        Ok(affected)
    }

    async fn run(conn: &libsql::Connection, statement: &TargetStatement) -> Result<u64, RemoteError> {
        match statement {
            TargetStatement::UpsertGroup(row) => Self::upsert_group(conn, row).await,
            TargetStatement::UpsertUser(row) => Self::upsert_user(conn, row).await,
            TargetStatement::DeleteGroup { id } => {
                Ok(conn.execute(r#"DELETE FROM "group" WHERE id = ?1"#, [id.as_str()]).await?)
            }
            TargetStatement::DeleteUser { id } => {
                Ok(conn.execute(r#"DELETE FROM "user" WHERE id = ?1"#, [id.as_str()]).await?)
            }
        }
    }
}

#[async_trait]
impl RemoteWriter for LibsqlRemoteWriter {
    async fn apply(&self, statement: &TargetStatement) -> Result<u64, RemoteError> {
        let _guard = self.lock.lock().await;
        let tx = self.target.conn().transaction().await?;
        match Self::run(&tx, statement).await {
            Ok(affected) => {
                tx.commit().await?;
                Ok(affected)
            }
            Err(e) => {
                // The statement error is what the caller needs; a rollback
                // failure on top of it adds nothing.
                let _ = tx.rollback().await;
                Err(e)
            }
        }
    }

    async fn exists(&self, target_type: TargetEntity, target_id: &str) -> Result<bool, RemoteError> {
        let sql = match target_type {
            TargetEntity::Group => r#"SELECT 1 FROM "group" WHERE id = ?1"#,
            TargetEntity::User => r#"SELECT 1 FROM "user" WHERE id = ?1"#,
        };
        let _guard = self.lock.lock().await;
        let mut rows = self.target.conn().query(sql, [target_id]).await?;
        Ok(rows.next().await?.is_some())
    }
}
