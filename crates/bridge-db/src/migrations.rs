//! Database migration runner.
//!
//! Embeds the SQL migration files at compile time and executes them on
//! database open. All statements use `IF NOT EXISTS` for idempotent re-running.

use crate::BridgeDb;
use crate::error::DatabaseError;
use crate::target::TargetDb;

/// Source schema: 5 tables, 6 indexes, 2 append-only triggers.
const SOURCE_001: &str = include_str!("../migrations/source/001_initial.sql");

/// Target schema: 2 tables, 1 unique index.
const TARGET_001: &str = include_str!("../migrations/target/001_initial.sql");

impl BridgeDb {
    /// Run all embedded source migrations in sequence.
    pub(crate) async fn run_migrations(&self) -> Result<(), DatabaseError> {
        self.conn()
            .execute_batch(SOURCE_001)
            .await
            .map_err(|e| DatabaseError::Migration(format!("source/001_initial: {e}")))?;
        Ok(())
    }
}

impl TargetDb {
    /// Run all embedded target migrations in sequence.
    pub(crate) async fn run_migrations(&self) -> Result<(), DatabaseError> {
        self.conn()
            .execute_batch(TARGET_001)
            .await
            .map_err(|e| DatabaseError::Migration(format!("target/001_initial: {e}")))?;
        Ok(())
    }
}
