//! Name, role, and id mapping from source rows to target statements.
//!
//! Everything here is a pure function of its inputs. The only failure mode is
//! a missing required field, reported as [`MappingError`].

use serde_json::json;

use crate::entities::{Organization, User};
use crate::enums::{TargetRole, UserRole};
use crate::errors::MappingError;
use crate::ids;
use crate::statement::{GroupRow, TargetStatement, TargetUserRow};

/// Separator between the team alias and the user alias.
pub const NAME_SEPARATOR: char = '-';

/// Target display name for a user.
///
/// `"{team_alias}-{user_alias}"` when the team alias is known and non-empty,
/// otherwise the user alias verbatim.
#[must_use]
pub fn display_name(user_alias: &str, team_alias: Option<&str>) -> String {
    match team_alias.filter(|alias| !alias.is_empty()) {
        Some(team) => format!("{team}{NAME_SEPARATOR}{user_alias}"),
        None => user_alias.to_string(),
    }
}

/// Collapse a source role onto the binary target role.
#[must_use]
pub const fn map_role(role: UserRole) -> TargetRole {
    if role.is_admin() {
        TargetRole::Admin
    } else {
        TargetRole::User
    }
}

/// Translate an organization into its group row.
///
/// # Errors
///
/// Returns `MappingError::MissingField` if the organization has no alias.
pub fn map_organization(org: &Organization) -> Result<GroupRow, MappingError> {
    let name = required(org.alias.as_deref(), "organization", &org.id, "alias")?;
    Ok(GroupRow {
        id: ids::group_id(&org.id),
        name: name.to_string(),
        description: format!("Synchronized from organization {}", org.id),
        meta: json!({
            "organization_id": org.id,
            "spend": org.spend,
            "models": org.models,
            "budget_id": org.budget_id,
            "metadata": org.metadata,
        }),
    })
}

/// Translate a user into its target row.
///
/// `team_alias` is the alias of the user's team as resolved by the caller,
/// `None` when the user has no team or the team is unknown.
///
/// # Errors
///
/// Returns `MappingError::MissingField` if the user has no alias.
pub fn map_user(user: &User, team_alias: Option<&str>) -> Result<TargetUserRow, MappingError> {
    let alias = required(user.alias.as_deref(), "user", &user.id, "alias")?;
    Ok(TargetUserRow {
        id: ids::target_user_id(&user.id),
        name: display_name(alias, team_alias),
        email: user.email.clone(),
        role: map_role(user.role),
        settings: json!({
            "max_budget": user.max_budget,
            "spend": user.spend,
            "models": user.models,
        }),
        info: json!({
            "original_user_id": user.id,
            "team_id": user.team_id,
            "organization_id": user.organization_id,
            "original_role": user.role.as_str(),
            "sso_user_id": user.sso_user_id,
        }),
    })
}

/// Upsert statement for an organization.
///
/// # Errors
///
/// Propagates [`map_organization`] errors.
pub fn organization_upsert(org: &Organization) -> Result<TargetStatement, MappingError> {
    map_organization(org).map(TargetStatement::UpsertGroup)
}

/// Upsert statement for a user.
///
/// # Errors
///
/// Propagates [`map_user`] errors.
pub fn user_upsert(user: &User, team_alias: Option<&str>) -> Result<TargetStatement, MappingError> {
    map_user(user, team_alias).map(TargetStatement::UpsertUser)
}

/// Delete statement for an organization's group.
#[must_use]
pub fn organization_delete(organization_id: &str) -> TargetStatement {
    TargetStatement::DeleteGroup {
        id: ids::group_id(organization_id),
    }
}

/// Delete statement for a user's target row.
#[must_use]
pub fn user_delete(user_id: &str) -> TargetStatement {
    TargetStatement::DeleteUser {
        id: ids::target_user_id(user_id),
    }
}

fn required<'a>(
    value: Option<&'a str>,
    entity: &'static str,
    id: &str,
    field: &'static str,
) -> Result<&'a str, MappingError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| MappingError::MissingField {
            entity,
            id: id.to_string(),
            field,
        })
}
