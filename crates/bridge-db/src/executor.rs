//! Cross-schema executor.
//!
//! Wraps a [`RemoteWriter`] with the statement timeout and turns every
//! outcome into a value. Nothing here returns `Err` to the dispatcher.

use std::sync::Arc;
use std::time::Duration;

use bridge_core::enums::TargetEntity;
use bridge_core::statement::TargetStatement;

use crate::remote::{RemoteError, RemoteWriter};

/// Result of one target write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecOutcome {
    Applied { rows_affected: u64 },
    Failed(RemoteError),
}

/// Applies target statements through an injected writer, bounded by a timeout.
#[derive(Clone)]
pub struct Executor {
    writer: Arc<dyn RemoteWriter>,
    timeout: Duration,
}

impl Executor {
    #[must_use]
    pub fn new(writer: Arc<dyn RemoteWriter>, timeout: Duration) -> Self {
        Self { writer, timeout }
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    fn timeout_error(&self) -> RemoteError {
        RemoteError::Timeout {
            timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Apply one statement. Timeouts and writer errors become `Failed`.
    pub async fn execute(&self, statement: &TargetStatement) -> ExecOutcome {
        let outcome = match tokio::time::timeout(self.timeout, self.writer.apply(statement)).await {
            Ok(Ok(rows_affected)) => ExecOutcome::Applied { rows_affected },
            Ok(Err(e)) => ExecOutcome::Failed(e),
            Err(_) => ExecOutcome::Failed(self.timeout_error()),
        };
        tracing::debug!(
            statement = %statement.describe(),
            target_id = statement.target_id(),
            ?outcome,
            "target statement executed"
        );
        outcome
    }

    /// Probe whether a target row exists, bounded by the same timeout.
    ///
    /// # Errors
    ///
    /// Returns the writer's error, or `RemoteError::Timeout`.
    pub async fn exists(&self, target_type: TargetEntity, target_id: &str) -> Result<bool, RemoteError> {
        tokio::time::timeout(self.timeout, self.writer.exists(target_type, target_id))
            .await
            .map_err(|_| self.timeout_error())?
    }
}
