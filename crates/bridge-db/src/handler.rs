//! Upstream trigger surface.
//!
//! The source mutation path calls one handler per entity type, inline, with
//! the open transaction's connection. Whatever the handler writes (mapping,
//! audit) commits or rolls back together with the mutation itself.

use std::sync::Arc;

use async_trait::async_trait;

use bridge_core::entities::{Organization, User};

use crate::dispatcher::{SyncDispatcher, SyncReport};
use crate::error::DatabaseError;

/// Reacts to committed-to-be source mutations of one entity type.
///
/// A failed target write is reported inside the returned [`SyncReport`].
/// `Err` means the source database itself failed, and the caller must abort
/// the unit of work.
#[async_trait]
pub trait EntityMutationHandler<T: Send + Sync>: Send + Sync {
    async fn on_insert(&self, conn: &libsql::Connection, after: &T) -> Result<SyncReport, DatabaseError>;

    async fn on_update(
        &self,
        conn: &libsql::Connection,
        before: &T,
        after: &T,
    ) -> Result<SyncReport, DatabaseError>;

    async fn on_delete(&self, conn: &libsql::Connection, before: &T) -> Result<SyncReport, DatabaseError>;
}

/// Handlers per synchronized entity type. Teams have none.
#[derive(Clone)]
pub struct HandlerRegistry {
    pub organization: Arc<dyn EntityMutationHandler<Organization>>,
    pub user: Arc<dyn EntityMutationHandler<User>>,
}

impl HandlerRegistry {
    #[must_use]
    pub fn new(
        organization: Arc<dyn EntityMutationHandler<Organization>>,
        user: Arc<dyn EntityMutationHandler<User>>,
    ) -> Self {
        Self { organization, user }
    }

    /// Register one dispatcher for both entity types.
    #[must_use]
    pub fn from_dispatcher(dispatcher: Arc<SyncDispatcher>) -> Self {
        Self {
            organization: dispatcher.clone(),
            user: dispatcher,
        }
    }
}
