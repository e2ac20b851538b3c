//! Database error types for bridge-db.

use thiserror::Error;

use bridge_core::errors::CoreError;

/// Errors from source-side database operations.
///
/// Target-side failures never surface here; they are [`crate::remote::RemoteError`]
/// values recorded in the audit log.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A SQL query failed or returned malformed data.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// A source entity addressed by id does not exist.
    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    /// Invalid state encountered (e.g., bad data in DB).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A core invariant was violated (e.g., an illegal sync transition).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A payload could not be serialized for storage.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),
}
