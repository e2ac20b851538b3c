//! Target-schema statements composed by the dispatcher and applied by a
//! remote writer.
//!
//! A statement is fully parameterized: it carries the complete target row (for
//! upserts) or the target id (for deletes), so applying it twice has the same
//! effect as applying it once.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{TargetEntity, TargetRole};

/// Column values for a `group` row.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct GroupRow {
    pub id: String,
    pub name: String,
    pub description: String,
    pub meta: serde_json::Value,
}

/// Column values for a target `user` row.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct TargetUserRow {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub role: TargetRole,
    pub settings: serde_json::Value,
    pub info: serde_json::Value,
}

/// One write against the target schema.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(tag = "statement", rename_all = "snake_case")]
pub enum TargetStatement {
    UpsertGroup(GroupRow),
    DeleteGroup { id: String },
    UpsertUser(TargetUserRow),
    DeleteUser { id: String },
}

impl TargetStatement {
    #[must_use]
    pub const fn target_type(&self) -> TargetEntity {
        match self {
            Self::UpsertGroup(_) | Self::DeleteGroup { .. } => TargetEntity::Group,
            Self::UpsertUser(_) | Self::DeleteUser { .. } => TargetEntity::User,
        }
    }

    #[must_use]
    pub fn target_id(&self) -> &str {
        match self {
            Self::UpsertGroup(row) => &row.id,
            Self::UpsertUser(row) => &row.id,
            Self::DeleteGroup { id } | Self::DeleteUser { id } => id,
        }
    }

    #[must_use]
    pub const fn is_delete(&self) -> bool {
        matches!(self, Self::DeleteGroup { .. } | Self::DeleteUser { .. })
    }

    /// Short label for logs, e.g. `upsert group`.
    #[must_use]
    pub fn describe(&self) -> String {
        let verb = if self.is_delete() { "delete" } else { "upsert" };
        format!("{verb} {}", self.target_type())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_statements_describe_their_target() {
        let stmt = TargetStatement::DeleteUser {
            id: "usr_charlie".into(),
        };
        assert!(stmt.is_delete());
        assert_eq!(stmt.target_id(), "usr_charlie");
        assert_eq!(stmt.describe(), "delete user");

        let stmt = TargetStatement::DeleteGroup {
            id: "grp_org_tech".into(),
        };
        assert_eq!(stmt.describe(), "delete group");
    }
}
