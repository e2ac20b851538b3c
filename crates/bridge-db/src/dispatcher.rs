//! Sync dispatcher.
//!
//! One attempt per source mutation:
//!
//! ```text
//! pending ──map──▶ mapped ──execute──▶ executed ──▶ recorded_success
//!    │                                          └─▶ recorded_failure
//!    └── mapping error ─────────────────────────▶ recorded_failure
//! ```
//!
//! Every attempt ends with exactly one audit entry. Target failures never
//! propagate; only a failure to write the bookkeeping rows does.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Serialize;

use bridge_core::entities::{Organization, User};
use bridge_core::enums::{MutationKind, SourceEntity, SyncOperation, SyncOutcome, SyncState};
use bridge_core::errors::CoreError;
use bridge_core::statement::TargetStatement;
use bridge_core::{ids, mapper};

use crate::error::DatabaseError;
use crate::executor::{ExecOutcome, Executor};
use crate::handler::EntityMutationHandler;
use crate::repos::audit::{AuditLog, NewAuditEntry};
use crate::repos::mapping::MappingStore;
use crate::repos::team;

/// What happened to one sync attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct SyncReport {
    pub operation: SyncOperation,
    pub record_id: String,
    pub target_id: String,
    pub state: SyncState,
    pub error: Option<String>,
    pub audit_id: i64,
}

impl SyncReport {
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.state == SyncState::RecordedSuccess
    }
}

struct Attempt {
    operation: SyncOperation,
    record_id: String,
    target_id: String,
    state: SyncState,
}

impl Attempt {
    fn new(operation: SyncOperation, record_id: &str, target_id: String) -> Self {
        Self {
            operation,
            record_id: record_id.to_string(),
            target_id,
            state: SyncState::Pending,
        }
    }

    fn advance(&mut self, next: SyncState) -> Result<(), CoreError> {
        if !self.state.can_transition_to(next) {
            return Err(CoreError::InvalidTransition {
                record_id: self.record_id.clone(),
                from: self.state.to_string(),
                to: next.to_string(),
            });
        }
        tracing::debug!(
            operation = %self.operation,
            record_id = %self.record_id,
            from = %self.state,
            to = %next,
            "sync transition"
        );
        self.state = next;
        Ok(())
    }

    fn into_report(self, audit_id: i64, error: Option<String>) -> SyncReport {
        SyncReport {
            operation: self.operation,
            record_id: self.record_id,
            target_id: self.target_id,
            state: self.state,
            error,
            audit_id,
        }
    }
}

/// Everything the dispatcher needs to run one attempt.
struct Job {
    operation: SyncOperation,
    record_id: String,
    target_id: String,
    statement: Result<TargetStatement, String>,
    old_data: Option<serde_json::Value>,
    new_data: Option<serde_json::Value>,
}

/// The shipped [`EntityMutationHandler`] for organizations and users.
pub struct SyncDispatcher {
    executor: Executor,
}

impl SyncDispatcher {
    #[must_use]
    pub const fn new(executor: Executor) -> Self {
        Self { executor }
    }

    #[must_use]
    pub const fn executor(&self) -> &Executor {
        &self.executor
    }

    async fn run(&self, conn: &libsql::Connection, job: Job) -> Result<SyncReport, DatabaseError> {
        let mut attempt = Attempt::new(job.operation, &job.record_id, job.target_id);
        let audit = AuditLog::new(conn);
        let entry = NewAuditEntry {
            operation: job.operation,
            record_id: job.record_id,
            old_data: job.old_data,
            new_data: job.new_data,
            result: SyncOutcome::Success,
            error_message: None,
        };

        let statement = match job.statement {
            Ok(statement) => {
                attempt.advance(SyncState::Mapped)?;
                statement
            }
            Err(reason) => {
                attempt.advance(SyncState::RecordedFailure)?;
                return Self::record_failure(&audit, attempt, entry, reason).await;
            }
        };

        let outcome = self.executor.execute(&statement).await;
        attempt.advance(SyncState::Executed)?;

        match outcome {
            ExecOutcome::Applied { rows_affected } => {
                let mappings = MappingStore::new(conn);
                let source_type = job.operation.source_entity();
                if job.operation.is_delete() {
                    mappings.delete(source_type, &entry.record_id).await?;
                } else {
                    mappings
                        .upsert(
                            source_type,
                            &entry.record_id,
                            statement.target_type(),
                            statement.target_id(),
                        )
                        .await?;
                }
                let audit_id = audit.append(&entry).await?;
                attempt.advance(SyncState::RecordedSuccess)?;
                tracing::info!(
                    operation = %attempt.operation,
                    record_id = %attempt.record_id,
                    target_id = %attempt.target_id,
                    rows_affected,
                    "synced"
                );
                Ok(attempt.into_report(audit_id, None))
            }
            ExecOutcome::Failed(e) => {
                attempt.advance(SyncState::RecordedFailure)?;
                Self::record_failure(&audit, attempt, entry, e.to_string()).await
            }
        }
    }

    async fn record_failure(
        audit: &AuditLog<'_>,
        attempt: Attempt,
        mut entry: NewAuditEntry,
        reason: String,
    ) -> Result<SyncReport, DatabaseError> {
        entry.result = SyncOutcome::Failure;
        entry.error_message = Some(reason.clone());
        let audit_id = audit.append(&entry).await?;
        tracing::warn!(
            operation = %attempt.operation,
            record_id = %attempt.record_id,
            target_id = %attempt.target_id,
            error = %reason,
            "sync failed"
        );
        Ok(attempt.into_report(audit_id, Some(reason)))
    }

    fn organization_job(
        kind: MutationKind,
        before: Option<&Organization>,
        after: Option<&Organization>,
        record_id: &str,
    ) -> Result<Job, DatabaseError> {
        let operation = SyncOperation::for_mutation(SourceEntity::Organization, kind)
            .ok_or_else(|| DatabaseError::InvalidState("organization has no sync operation".into()))?;
        let statement = match after {
            Some(org) => mapper::organization_upsert(org).map_err(|e| e.to_string()),
            None => Ok(mapper::organization_delete(record_id)),
        };
        Ok(Job {
            operation,
            record_id: record_id.to_string(),
            target_id: ids::group_id(record_id),
            statement,
            old_data: before.map(serde_json::to_value).transpose()?,
            new_data: after.map(serde_json::to_value).transpose()?,
        })
    }

    async fn user_job(
        conn: &libsql::Connection,
        kind: MutationKind,
        before: Option<&User>,
        after: Option<&User>,
        record_id: &str,
    ) -> Result<Job, DatabaseError> {
        let operation = SyncOperation::for_mutation(SourceEntity::User, kind)
            .ok_or_else(|| DatabaseError::InvalidState("user has no sync operation".into()))?;
        let statement = match after {
            Some(user) => match user.team_id.as_deref() {
                Some(team_id) => match team::find_alias(conn, team_id).await {
                    Ok(alias) => mapper::user_upsert(user, alias.as_deref()).map_err(|e| e.to_string()),
                    Err(e) => Err(format!("team alias lookup for '{team_id}': {e}")),
                },
                None => mapper::user_upsert(user, None).map_err(|e| e.to_string()),
            },
            None => Ok(mapper::user_delete(record_id)),
        };
        Ok(Job {
            operation,
            record_id: record_id.to_string(),
            target_id: ids::target_user_id(record_id),
            statement,
            old_data: before.map(serde_json::to_value).transpose()?,
            new_data: after.map(serde_json::to_value).transpose()?,
        })
    }
}

#[async_trait]
impl EntityMutationHandler<Organization> for SyncDispatcher {
    async fn on_insert(&self, conn: &libsql::Connection, after: &Organization) -> Result<SyncReport, DatabaseError> {
        let job = Self::organization_job(MutationKind::Insert, None, Some(after), &after.id)?;
        self.run(conn, job).await
    }

    async fn on_update(
        &self,
        conn: &libsql::Connection,
        before: &Organization,
        after: &Organization,
    ) -> Result<SyncReport, DatabaseError> {
        let job = Self::organization_job(MutationKind::Update, Some(before), Some(after), &after.id)?;
        self.run(conn, job).await
    }

    async fn on_delete(&self, conn: &libsql::Connection, before: &Organization) -> Result<SyncReport, DatabaseError> {
        let job = Self::organization_job(MutationKind::Delete, Some(before), None, &before.id)?;
        self.run(conn, job).await
    }
}

#[async_trait]
impl EntityMutationHandler<User> for SyncDispatcher {
    async fn on_insert(&self, conn: &libsql::Connection, after: &User) -> Result<SyncReport, DatabaseError> {
        let job = Self::user_job(conn, MutationKind::Insert, None, Some(after), &after.id).await?;
        self.run(conn, job).await
    }

    async fn on_update(
        &self,
        conn: &libsql::Connection,
        before: &User,
        after: &User,
    ) -> Result<SyncReport, DatabaseError> {
        let job = Self::user_job(conn, MutationKind::Update, Some(before), Some(after), &after.id).await?;
        self.run(conn, job).await
    }

    async fn on_delete(&self, conn: &libsql::Connection, before: &User) -> Result<SyncReport, DatabaseError> {
        let job = Self::user_job(conn, MutationKind::Delete, Some(before), None, &before.id).await?;
        self.run(conn, job).await
    }
}
