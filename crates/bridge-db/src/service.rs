//! Service layer orchestrating source mutations with inline sync.
//!
//! `SyncService` wraps `BridgeDb` (source database), an [`Executor`] (target
//! writes) and the [`HandlerRegistry`]. Entity repos are implemented as
//! `impl SyncService` blocks.

use std::sync::Arc;

use libsql::TransactionBehavior;
use tokio::sync::{Mutex, MutexGuard};

use bridge_config::BridgeConfig;
use bridge_core::entities::SyncAuditEntry;

use crate::BridgeDb;
use crate::dispatcher::SyncDispatcher;
use crate::error::DatabaseError;
use crate::executor::Executor;
use crate::handler::HandlerRegistry;
use crate::remote::LibsqlRemoteWriter;
use crate::repos::audit::{AuditFilter, AuditLog};
use crate::repos::status::SyncStatus;
use crate::target::TargetDb;

/// Runs every source mutation as one unit of work.
///
/// Every mutation method follows this protocol:
/// 1. Take the write gate
/// 2. Begin an IMMEDIATE transaction
/// 3. Execute SQL
/// 4. Invoke the entity's handler (target write, mapping, audit)
/// 5. Commit, or roll back if any source write failed
pub struct SyncService {
    source: BridgeDb,
    executor: Executor,
    handlers: HandlerRegistry,
    write_gate: Mutex<()>,
    default_limit: u32,
}

impl SyncService {
    /// Wire the shipped dispatcher for both entity types.
    #[must_use]
    pub fn new(source: BridgeDb, executor: Executor) -> Self {
        let dispatcher = Arc::new(SyncDispatcher::new(executor.clone()));
        Self::with_handlers(source, executor, HandlerRegistry::from_dispatcher(dispatcher))
    }

    /// Use caller-supplied handlers. The executor is still used for
    /// reconciliation probes.
    #[must_use]
    pub fn with_handlers(source: BridgeDb, executor: Executor, handlers: HandlerRegistry) -> Self {
        Self {
            source,
            executor,
            handlers,
            write_gate: Mutex::new(()),
            default_limit: 50,
        }
    }

    /// Open source and target as configured and wire a libSQL remote writer.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if either database cannot be opened.
    pub async fn open(config: &BridgeConfig) -> Result<Self, DatabaseError> {
        let source = BridgeDb::open_local(&config.source.path).await?;
        let target = Arc::new(TargetDb::open(&config.target).await?);
        tracing::debug!(
            source = %config.source.path,
            remote = target.is_remote(),
            "opened bridge databases"
        );
        let writer = Arc::new(LibsqlRemoteWriter::new(target));
        let executor = Executor::new(writer, config.target.statement_timeout());
        let mut service = Self::new(source, executor);
        service.default_limit = config.general.default_limit;
        Ok(service)
    }

    /// Access the underlying source database handle.
    #[must_use]
    pub const fn db(&self) -> &BridgeDb {
        &self.source
    }

    #[must_use]
    pub const fn executor(&self) -> &Executor {
        &self.executor
    }

    #[must_use]
    pub const fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    #[must_use]
    pub const fn default_limit(&self) -> u32 {
        self.default_limit
    }

    /// Serialize writers and open an IMMEDIATE transaction.
    pub(crate) async fn begin(
        &self,
    ) -> Result<(MutexGuard<'_, ()>, libsql::Transaction), DatabaseError> {
        let gate = self.write_gate.lock().await;
        let tx = self
            .source
            .conn()
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .await?;
        Ok((gate, tx))
    }

    /// Commit on success, roll back on error.
    pub(crate) async fn finish<T>(
        tx: libsql::Transaction,
        result: Result<T, DatabaseError>,
    ) -> Result<T, DatabaseError> {
        match result {
            Ok(value) => {
                tx.commit().await?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback) = tx.rollback().await {
                    tracing::error!(error = %rollback, "rollback failed");
                }
                Err(e)
            }
        }
    }

    /// Query the sync audit log. A filter without a limit uses the configured default.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn query_audit(&self, filter: &AuditFilter) -> Result<Vec<SyncAuditEntry>, DatabaseError> {
        let mut filter = filter.clone();
        filter.limit.get_or_insert(self.default_limit);
        AuditLog::new(self.source.conn()).query(&filter).await
    }

    /// Aggregate counts over source entities, mappings and the audit log.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if any count query fails.
    pub async fn sync_status(&self) -> Result<SyncStatus, DatabaseError> {
        SyncStatus::collect(self.source.conn()).await
    }
}
