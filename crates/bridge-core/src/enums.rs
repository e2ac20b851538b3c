//! Entity kinds, operation tags, roles, and the sync state machine.
//!
//! Storage-facing enums expose `as_str()` returning the exact text persisted
//! in SQL. Serde representations match `as_str()` so rows can be parsed back
//! through `serde_json`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// SourceEntity
// ---------------------------------------------------------------------------

/// Entity types of the source (gateway) schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SourceEntity {
    Organization,
    Team,
    User,
}

impl SourceEntity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Organization => "organization",
            Self::Team => "team",
            Self::User => "user",
        }
    }
}

impl fmt::Display for SourceEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// TargetEntity
// ---------------------------------------------------------------------------

/// Entity types of the target (chat application) schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TargetEntity {
    Group,
    User,
}

impl TargetEntity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Group => "group",
            Self::User => "user",
        }
    }
}

impl fmt::Display for TargetEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// MutationKind
// ---------------------------------------------------------------------------

/// Kind of source mutation that fired a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    Insert,
    Update,
    Delete,
}

impl MutationKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SyncOperation
// ---------------------------------------------------------------------------

/// Operation tag recorded on every audit entry.
///
/// Creates and updates share a tag because both are upserts on the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncOperation {
    SyncOrg,
    DeleteOrg,
    SyncUser,
    DeleteUser,
}

impl SyncOperation {
    pub const ALL: [Self; 4] = [Self::SyncOrg, Self::DeleteOrg, Self::SyncUser, Self::DeleteUser];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SyncOrg => "SYNC_ORG",
            Self::DeleteOrg => "DELETE_ORG",
            Self::SyncUser => "SYNC_USER",
            Self::DeleteUser => "DELETE_USER",
        }
    }

    /// Tag for a mutation of the given source entity, or `None` for teams.
    #[must_use]
    pub const fn for_mutation(entity: SourceEntity, kind: MutationKind) -> Option<Self> {
        match (entity, kind) {
            (SourceEntity::Organization, MutationKind::Insert | MutationKind::Update) => {
                Some(Self::SyncOrg)
            }
            (SourceEntity::Organization, MutationKind::Delete) => Some(Self::DeleteOrg),
            (SourceEntity::User, MutationKind::Insert | MutationKind::Update) => {
                Some(Self::SyncUser)
            }
            (SourceEntity::User, MutationKind::Delete) => Some(Self::DeleteUser),
            (SourceEntity::Team, _) => None,
        }
    }

    /// Source entity type the operation concerns.
    #[must_use]
    pub const fn source_entity(self) -> SourceEntity {
        match self {
            Self::SyncOrg | Self::DeleteOrg => SourceEntity::Organization,
            Self::SyncUser | Self::DeleteUser => SourceEntity::User,
        }
    }

    #[must_use]
    pub const fn is_delete(self) -> bool {
        matches!(self, Self::DeleteOrg | Self::DeleteUser)
    }
}

impl fmt::Display for SyncOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SyncOutcome
// ---------------------------------------------------------------------------

/// Outcome of one sync attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncOutcome {
    Success,
    Failure,
}

impl SyncOutcome {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
        }
    }
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// UserRole
// ---------------------------------------------------------------------------

/// Role of a source user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    ProxyAdmin,
    ProxyAdminViewer,
    #[default]
    InternalUser,
    InternalUserViewer,
    Team,
    Customer,
}

impl UserRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ProxyAdmin => "proxy_admin",
            Self::ProxyAdminViewer => "proxy_admin_viewer",
            Self::InternalUser => "internal_user",
            Self::InternalUserViewer => "internal_user_viewer",
            Self::Team => "team",
            Self::Customer => "customer",
        }
    }

    /// Whether the role is one of the designated administrative roles.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::ProxyAdmin | Self::ProxyAdminViewer)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// TargetRole
// ---------------------------------------------------------------------------

/// Binary role of a target user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TargetRole {
    Admin,
    User,
}

impl TargetRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }
}

impl fmt::Display for TargetRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SyncState
// ---------------------------------------------------------------------------

/// Progress of a single sync attempt.
///
/// ```text
/// pending → mapped → executed → recorded_success
///                             → recorded_failure
/// pending → recorded_failure            (mapping error)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    Pending,
    Mapped,
    Executed,
    RecordedSuccess,
    RecordedFailure,
}

impl SyncState {
    /// Valid next states from the current state.
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Mapped, Self::RecordedFailure],
            Self::Mapped => &[Self::Executed],
            Self::Executed => &[Self::RecordedSuccess, Self::RecordedFailure],
            Self::RecordedSuccess | Self::RecordedFailure => &[],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::RecordedSuccess | Self::RecordedFailure)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Mapped => "mapped",
            Self::Executed => "executed",
            Self::RecordedSuccess => "recorded_success",
            Self::RecordedFailure => "recorded_failure",
        }
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_serde_matches_as_str() {
        for op in SyncOperation::ALL {
            let json = serde_json::to_value(op).unwrap();
            assert_eq!(json, serde_json::Value::String(op.as_str().to_string()));
        }
    }

    #[test]
    fn operation_for_mutation() {
        assert_eq!(
            SyncOperation::for_mutation(SourceEntity::Organization, MutationKind::Insert),
            Some(SyncOperation::SyncOrg)
        );
        assert_eq!(
            SyncOperation::for_mutation(SourceEntity::Organization, MutationKind::Update),
            Some(SyncOperation::SyncOrg)
        );
        assert_eq!(
            SyncOperation::for_mutation(SourceEntity::User, MutationKind::Delete),
            Some(SyncOperation::DeleteUser)
        );
        assert_eq!(
            SyncOperation::for_mutation(SourceEntity::Team, MutationKind::Update),
            None
        );
    }

    #[test]
    fn only_proxy_admin_roles_are_admin() {
        assert!(UserRole::ProxyAdmin.is_admin());
        assert!(UserRole::ProxyAdminViewer.is_admin());
        assert!(!UserRole::InternalUser.is_admin());
        assert!(!UserRole::InternalUserViewer.is_admin());
        assert!(!UserRole::Team.is_admin());
        assert!(!UserRole::Customer.is_admin());
    }

    #[test]
    fn sync_state_transitions() {
        assert!(SyncState::Pending.can_transition_to(SyncState::Mapped));
        assert!(SyncState::Pending.can_transition_to(SyncState::RecordedFailure));
        assert!(!SyncState::Pending.can_transition_to(SyncState::RecordedSuccess));
        assert!(!SyncState::Mapped.can_transition_to(SyncState::RecordedFailure));
        assert!(SyncState::Executed.can_transition_to(SyncState::RecordedSuccess));
        assert!(SyncState::RecordedSuccess.allowed_next_states().is_empty());
        assert!(SyncState::RecordedFailure.is_terminal());
    }
}
