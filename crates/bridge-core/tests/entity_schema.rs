//! Schema validation for the payloads the engine persists or exports.

use chrono::Utc;
use schemars::schema_for;
use serde_json::json;

use bridge_core::entities::{SyncAuditEntry, SyncMapping, User};
use bridge_core::enums::{SourceEntity, SyncOperation, SyncOutcome, TargetEntity, UserRole};
use bridge_core::ids;
use bridge_core::mapper;
use bridge_core::statement::TargetStatement;

fn validate_against_schema(
    schema: &serde_json::Value,
    instance: &serde_json::Value,
) -> Vec<String> {
    let validator = jsonschema::validator_for(schema).expect("schema should be valid");
    validator
        .iter_errors(instance)
        .map(|e| format!("{e}"))
        .collect()
}

#[test]
fn delete_audit_entry_matches_schema() {
    let user = User {
        email: Some("charlie@techcorp.com".into()),
        role: UserRole::ProxyAdmin,
        ..User::new("charlie", "Charlie Davis")
    };
    let entry = SyncAuditEntry {
        id: 7,
        operation: SyncOperation::DeleteUser,
        record_id: user.id.clone(),
        old_data: Some(serde_json::to_value(&user).unwrap()),
        new_data: None,
        result: SyncOutcome::Success,
        error_message: None,
        created_at: Utc::now(),
    };

    let schema = serde_json::to_value(schema_for!(SyncAuditEntry)).unwrap();
    let instance = serde_json::to_value(&entry).unwrap();
    let errors = validate_against_schema(&schema, &instance);
    assert!(errors.is_empty(), "schema errors: {errors:?}");
    assert_eq!(instance["operation"], "DELETE_USER");
    assert_eq!(instance["result"], "SUCCESS");
    assert_eq!(instance["old_data"]["email"], "charlie@techcorp.com");
}

#[test]
fn audit_entry_with_unknown_operation_is_rejected() {
    let schema = serde_json::to_value(schema_for!(SyncAuditEntry)).unwrap();
    let instance = json!({
        "id": 1,
        "operation": "SYNC_TEAM",
        "record_id": "team_backend",
        "old_data": null,
        "new_data": null,
        "result": "SUCCESS",
        "error_message": null,
        "created_at": Utc::now().to_rfc3339(),
    });
    assert!(!validate_against_schema(&schema, &instance).is_empty());
}

#[test]
fn mapping_row_matches_schema() {
    let now = Utc::now();
    let mapping = SyncMapping {
        source_type: SourceEntity::User,
        source_id: "alice".into(),
        target_type: TargetEntity::User,
        target_id: ids::target_user_id("alice"),
        created_at: now,
        updated_at: now,
    };
    let schema = serde_json::to_value(schema_for!(SyncMapping)).unwrap();
    let instance = serde_json::to_value(&mapping).unwrap();
    assert!(validate_against_schema(&schema, &instance).is_empty());
}

#[test]
fn statements_are_tagged() {
    let user = User::new("eve", "Eve Thompson");
    let stmt = mapper::user_upsert(&user, None).unwrap();
    let value = serde_json::to_value(&stmt).unwrap();
    assert_eq!(value["statement"], "upsert_user");
    assert_eq!(value["name"], "Eve Thompson");

    let schema = serde_json::to_value(schema_for!(TargetStatement)).unwrap();
    assert!(validate_against_schema(&schema, &value).is_empty());
}

#[test]
fn id_mapping_is_idempotent() {
    for id in ["alice", "bob", "charlie", "diana", "eve", "org_tech"] {
        let first = mapper::user_delete(id);
        let second = mapper::user_delete(id);
        assert_eq!(first, second);
        assert_eq!(
            mapper::organization_delete(id).target_id(),
            ids::group_id(id)
        );
    }
}
