//! Cross-cutting error types.
//!
//! Storage errors (`DatabaseError`, `RemoteError`) live in `bridge-db`.

use thiserror::Error;

/// Invariant violations raised by the sync state machine.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A sync state transition was attempted that is not allowed.
    #[error("Invalid sync transition for {record_id}: {from} -> {to}")]
    InvalidTransition {
        record_id: String,
        from: String,
        to: String,
    },
}

/// A source row cannot be translated into its target representation.
///
/// Only malformed upstream data triggers this. The dispatcher records it as a
/// FAILURE audit entry and never retries.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MappingError {
    /// A field the mapping depends on is absent or empty.
    #[error("{entity} {id}: required field '{field}' is missing")]
    MissingField {
        entity: &'static str,
        id: String,
        field: &'static str,
    },
}
