use serde::de::DeserializeOwned;

/// Parse an enum flag through serde, accepting kebab-case and any letter case.
///
/// The value is tried as snake_case first, then SCREAMING_SNAKE_CASE, so
/// `delete-user`, `DELETE_USER` and `failure` all resolve.
pub fn parse_enum<T>(raw: &str, field: &str) -> anyhow::Result<T>
where
    T: DeserializeOwned,
{
    let normalized = raw.replace('-', "_");
    let candidates = [normalized.to_lowercase(), normalized.to_uppercase()];
    candidates
        .iter()
        .find_map(|candidate| serde_json::from_value(serde_json::Value::String(candidate.clone())).ok())
        .ok_or_else(|| anyhow::anyhow!("invalid {field} '{raw}'"))
}

#[cfg(test)]
mod tests {
    use bridge_core::enums::{SyncOperation, SyncOutcome};

    use super::parse_enum;

    #[test]
    fn parses_hyphenated_operation() {
        let op: SyncOperation = parse_enum("delete-user", "operation").expect("operation should parse");
        assert_eq!(op, SyncOperation::DeleteUser);
    }

    #[test]
    fn parses_lowercase_outcome() {
        let outcome: SyncOutcome = parse_enum("failure", "result").expect("result should parse");
        assert_eq!(outcome, SyncOutcome::Failure);
    }

    #[test]
    fn errors_on_invalid_enum() {
        let err = parse_enum::<SyncOperation>("sync-team", "operation").expect_err("should fail");
        assert!(err.to_string().contains("invalid operation 'sync-team'"));
    }
}
