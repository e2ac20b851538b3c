//! Repository modules for the source database.
//!
//! Entity repos add CRUD methods to `SyncService` via `impl SyncService`
//! blocks. The bookkeeping stores ([`mapping::MappingStore`],
//! [`audit::AuditLog`]) borrow a connection so the dispatcher can use them
//! inside the caller's transaction.

pub mod audit;
pub mod mapping;
pub mod organization;
pub mod status;
pub mod team;
pub mod user;
