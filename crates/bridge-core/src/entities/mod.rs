//! Entity structs for both schemas plus the sync bookkeeping records.
//!
//! Source entities (`Organization`, `Team`, `User`) are authoritative; target
//! entities (`Group`, `TargetUser`) are derived. All structs derive
//! `Serialize`, `Deserialize`, and `JsonSchema` so they can be stored as audit
//! payloads and exported as schemas.

mod audit;
mod group;
mod mapping;
mod organization;
mod target_user;
mod team;
mod user;

pub use audit::SyncAuditEntry;
pub use group::Group;
pub use mapping::SyncMapping;
pub use organization::Organization;
pub use target_user::TargetUser;
pub use team::Team;
pub use user::User;

/// An empty JSON object, the default for free-form metadata columns.
#[must_use]
pub fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}
