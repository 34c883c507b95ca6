//! Partial-update resolution against the real task schema.

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use rstest::rstest;
use serde_json::{Value, json};

use task_service::domain::{
    FieldKind, FieldValue, SparseMap, TASK_SCHEMA, TASK_STATUSES, Task, TaskId, Timestamp,
    UpdateError, resolve,
};

fn fixed_time() -> Timestamp {
    Timestamp::from_datetime(Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap())
}

fn base() -> Task {
    Task::update_base(TaskId::new(7), fixed_time())
}

fn changes(value: &Value) -> SparseMap {
    value.as_object().cloned().unwrap_or_default()
}

// =============================================================================
// Scenarios
// =============================================================================

#[rstest]
fn test_description_and_status_update() {
    let base = Task::new(TaskId::new(7), "placeholder", fixed_time());

    let resolved = resolve(
        base.clone(),
        &changes(&json!({ "description": "urgent", "status": "done" })),
    )
    .unwrap();

    assert_eq!(
        resolved.columns().collect::<Vec<_>>(),
        ["description", "status"]
    );
    assert_eq!(
        resolved.values().cloned().collect::<Vec<_>>(),
        [
            FieldValue::OptionalText(Some("urgent".to_string())),
            FieldValue::Text("done".to_string()),
        ]
    );
    assert_eq!(
        resolved.record,
        base.with_description("urgent").with_status("done")
    );
}

#[rstest]
fn test_key_order_does_not_change_columns() {
    let forward = resolve(base(), &changes(&json!({ "title": "a", "status": "done" }))).unwrap();
    let reverse = resolve(base(), &changes(&json!({ "status": "done", "title": "a" }))).unwrap();

    assert_eq!(forward.assignments, reverse.assignments);
    assert_eq!(forward.columns().collect::<Vec<_>>(), ["title", "status"]);
}

#[rstest]
#[case(json!({ "id": 9 }), "id")]
#[case(json!({ "id": 9, "title": "x" }), "id")]
#[case(json!({ "created_at": "2024-01-01T00:00:00Z" }), "created_at")]
#[case(json!({ "status": "done", "updated_at": "2024-01-01T00:00:00Z" }), "updated_at")]
fn test_immutable_fields_are_rejected(#[case] input: Value, #[case] field: &'static str) {
    let error = resolve(base(), &changes(&input)).unwrap_err();
    assert_eq!(error, UpdateError::ImmutableField { field });
}

#[rstest]
fn test_unknown_status_fails_validation() {
    let error = resolve(base(), &changes(&json!({ "status": "archived" }))).unwrap_err();

    let UpdateError::Validation(validation) = error else {
        panic!("expected validation error, got {error:?}");
    };
    assert!(validation.mentions("status"));
    assert!(!validation.mentions("title"));
}

#[rstest]
#[case(json!({ "status": 5 }), "status", FieldKind::String)]
#[case(json!({ "title": true }), "title", FieldKind::String)]
#[case(json!({ "description": null }), "description", FieldKind::OptionalString)]
#[case(json!({ "description": 3 }), "description", FieldKind::OptionalString)]
fn test_wrong_kind_is_type_mismatch(
    #[case] input: Value,
    #[case] field: &'static str,
    #[case] expected: FieldKind,
) {
    let error = resolve(base(), &changes(&input)).unwrap_err();
    assert_eq!(error, UpdateError::TypeMismatch { field, expected });
}

#[rstest]
fn test_empty_map_yields_no_assignments() {
    let resolved = resolve(base(), &SparseMap::new()).unwrap();

    assert!(resolved.is_empty());
    assert_eq!(resolved.record.title, "placeholder");
}

#[rstest]
fn test_omitted_title_gets_placeholder_without_column() {
    let resolved = resolve(base(), &changes(&json!({ "status": "in_progress" }))).unwrap();

    assert!(resolved.columns().all(|column| column != "title"));
    assert!(!resolved.record.title.trim().is_empty());
}

#[rstest]
fn test_supplied_blank_title_fails_validation() {
    let error = resolve(base(), &changes(&json!({ "title": "" }))).unwrap_err();
    assert!(matches!(error, UpdateError::Validation(ref v) if v.mentions("title")));
}

#[rstest]
fn test_schema_declares_task_table() {
    assert_eq!(TASK_SCHEMA.table(), "tasks");
    assert_eq!(TASK_SCHEMA.identity().name, "id");
    assert!(!TASK_SCHEMA.field("created_at").unwrap().mutable);
}

// =============================================================================
// Property Tests
// =============================================================================

fn task_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i32>().prop_map(Value::from),
        "[a-z ]{0,16}".prop_map(Value::String),
        proptest::sample::select(TASK_STATUSES).prop_map(Value::from),
        Just(Value::Null),
    ]
}

fn task_changes() -> impl Strategy<Value = SparseMap> {
    proptest::collection::btree_map(
        prop_oneof![
            Just("title"),
            Just("description"),
            Just("status"),
            Just("created_at"),
            Just("unknown"),
        ],
        task_value(),
        0..5,
    )
    .prop_map(|entries| {
        entries
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect()
    })
}

proptest! {
    #[test]
    fn resolve_is_deterministic(map in task_changes()) {
        prop_assert_eq!(resolve(base(), &map), resolve(base(), &map));
    }

    #[test]
    fn resolve_never_accepts_id(map in task_changes(), id in task_value()) {
        let mut map = map;
        map.insert("id".to_string(), id);
        prop_assert_eq!(
            resolve(base(), &map),
            Err(UpdateError::ImmutableField { field: "id" })
        );
    }

    #[test]
    fn resolved_record_is_valid(map in task_changes()) {
        if let Ok(resolved) = resolve(base(), &map) {
            prop_assert!(resolved.record.validate().is_ok());
            prop_assert!(resolved.columns().all(|column| map.contains_key(column)));
        }
    }

    #[test]
    fn valid_status_alone_always_resolves(status in proptest::sample::select(TASK_STATUSES)) {
        let resolved = resolve(base(), &changes(&json!({ "status": status })));
        prop_assert!(resolved.is_ok());
    }
}
