//! Deterministic id scheme between the source and target schemas.
//!
//! Target ids are a fixed prefix plus the source id, so the same source id
//! always maps to the same target id and re-running a sync is an upsert of the
//! same row. Distinct source ids cannot collide because the prefix is constant.

/// Prefix for groups derived from organizations.
pub const PREFIX_GROUP: &str = "grp_";

/// Prefix for target users derived from source users.
pub const PREFIX_USER: &str = "usr_";

/// Target group id for a source organization id.
#[must_use]
pub fn group_id(organization_id: &str) -> String {
    format!("{PREFIX_GROUP}{organization_id}")
}

/// Target user id for a source user id.
#[must_use]
pub fn target_user_id(user_id: &str) -> String {
    format!("{PREFIX_USER}{user_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_prefixed() {
        assert_eq!(group_id("org_tech"), "grp_org_tech");
        assert_eq!(target_user_id("charlie"), "usr_charlie");
    }

    #[test]
    fn mapping_is_deterministic() {
        for id in ["alice", "bob", "", "usr_nested", "org with spaces"] {
            assert_eq!(target_user_id(id), target_user_id(id));
            assert_eq!(group_id(id), group_id(id));
        }
    }

    #[test]
    fn distinct_sources_never_collide() {
        let ids = ["a", "b", "a_b", "ab", "_ab"];
        let mapped: std::collections::HashSet<_> = ids.iter().map(|id| target_user_id(id)).collect();
        assert_eq!(mapped.len(), ids.len());
    }
}
