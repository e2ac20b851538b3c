//! # bridge-db
//!
//! libSQL storage and the sync engine for the org/user bridge.
//!
//! The source database holds organizations, teams and users together with the
//! bridge's own bookkeeping (`sync_mapping`, `sync_audit`). The target
//! database is the chat application's `group`/`user` schema, reached only
//! through a [`remote::RemoteWriter`].
//!
//! Every source mutation goes through [`service::SyncService`], which runs the
//! registered [`handler::EntityMutationHandler`] inline in the same IMMEDIATE
//! transaction.

pub mod dispatcher;
pub mod error;
pub mod executor;
pub mod handler;
pub mod helpers;
mod migrations;
pub mod reconcile;
pub mod remote;
pub mod repos;
pub mod service;
pub mod target;

#[cfg(test)]
mod test_support;

use error::DatabaseError;
use libsql::Builder;

/// How long a writer waits for another process's IMMEDIATE transaction.
pub const SOURCE_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Handle on the source database.
pub struct BridgeDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl BridgeDb {
    /// Open a local source database at the given path, or `":memory:"`.
    ///
    /// Runs migrations automatically on open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Enable foreign keys (must be per-connection in SQLite)
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        // Returns the new value as a row, so it cannot go through `execute`.
        let mut rows = conn
            .query(&format!("PRAGMA busy_timeout = {SOURCE_BUSY_TIMEOUT_MS}"), ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA busy_timeout: {e}")))?;
        rows.next()
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA busy_timeout: {e}")))?;
        drop(rows);

        let bridge_db = Self { db, conn };
        bridge_db.run_migrations().await?;
        Ok(bridge_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }
}
