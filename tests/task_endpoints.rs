//! Router-level tests for the task endpoints.
//!
//! Requests go through the full middleware stack (content-type guard, panic
//! recovery, tracing) over an in-memory repository.

mod common;

use axum::http::{Method, StatusCode};
use rstest::rstest;
use serde_json::{Value, json};

use common::{create_test_app, send, send_empty, send_json};

async fn create(app: &axum::Router, body: Value) -> Value {
    let (status, json) = send_json(app, Method::POST, "/tasks", &body).await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    json
}

// =============================================================================
// GET /health
// =============================================================================

#[rstest]
#[tokio::test]
async fn test_health_check() {
    let app = create_test_app();

    let (status, json) = send_empty(&app, Method::GET, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
}

// =============================================================================
// POST /tasks
// =============================================================================

#[rstest]
#[tokio::test]
async fn test_create_task() {
    let app = create_test_app();

    let json = create(
        &app,
        json!({ "title": "Write report", "description": "Q3", "status": "in_progress" }),
    )
    .await;

    assert_eq!(json["id"], 1);
    assert_eq!(json["title"], "Write report");
    assert_eq!(json["description"], "Q3");
    assert_eq!(json["status"], "in_progress");
    assert_eq!(json["created_at"], json["updated_at"]);
}

#[rstest]
#[case(json!({}), "title")]
#[case(json!({ "title": "   " }), "title")]
#[case(json!({ "title": "t", "status": "archived" }), "status")]
#[case(json!({ "title": "a".repeat(201) }), "title")]
#[case(json!({ "title": "t", "description": "d".repeat(5001) }), "description")]
#[tokio::test]
async fn test_create_task_validation(#[case] body: Value, #[case] field: &str) {
    let app = create_test_app();

    let (status, json) = send_json(&app, Method::POST, "/tasks", &body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["details"][0]["field"], field);
}

#[rstest]
#[tokio::test]
async fn test_create_task_with_empty_status_defaults_to_new() {
    let app = create_test_app();

    let json = create(&app, json!({ "title": "t", "status": "" })).await;

    assert_eq!(json["status"], "new");
}

#[rstest]
#[tokio::test]
async fn test_create_task_malformed_body() {
    let app = create_test_app();

    let (status, json) = send(&app, Method::POST, "/tasks", Some("application/json"), "{").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
}

// =============================================================================
// Content-Type Guard
// =============================================================================

#[rstest]
#[case(Method::POST, "/tasks", None)]
#[case(Method::POST, "/tasks", Some("text/plain"))]
#[case(Method::POST, "/tasks", Some("application/json; charset=latin-1"))]
#[case(Method::PUT, "/tasks/1", Some("application/x-www-form-urlencoded"))]
#[case(Method::PATCH, "/tasks/1", None)]
#[tokio::test]
async fn test_body_requests_require_json(
    #[case] method: Method,
    #[case] uri: &str,
    #[case] content_type: Option<&str>,
) {
    let app = create_test_app();
    create(&app, json!({ "title": "t" })).await;

    let (status, json) = send(&app, method, uri, content_type, r#"{"title": "x"}"#).await;

    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(json["code"], "UNSUPPORTED_MEDIA_TYPE");
}

#[rstest]
#[tokio::test]
async fn test_plain_json_content_type_is_accepted() {
    let app = create_test_app();

    let (status, _) = send(
        &app,
        Method::POST,
        "/tasks",
        Some("application/json"),
        r#"{"title": "x"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
}

#[rstest]
#[tokio::test]
async fn test_get_and_delete_need_no_content_type() {
    let app = create_test_app();
    create(&app, json!({ "title": "t" })).await;

    let (status, _) = send_empty(&app, Method::GET, "/tasks/1").await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = send_empty(&app, Method::DELETE, "/tasks/1").await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(json, Value::Null);
}

// =============================================================================
// GET /tasks
// =============================================================================

#[rstest]
#[tokio::test]
async fn test_list_tasks_paginates_in_id_order() {
    let app = create_test_app();
    for index in 1..=5 {
        create(&app, json!({ "title": format!("task {index}") })).await;
    }

    let (status, json) = send_empty(&app, Method::GET, "/tasks?page=2&limit=2").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["page"], 2);
    assert_eq!(json["limit"], 2);
    assert_eq!(json["total"], 5);
    assert_eq!(json["total_pages"], 3);
    let ids: Vec<i64> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|task| task["id"].as_i64())
        .collect();
    assert_eq!(ids, [3, 4]);
}

#[rstest]
#[tokio::test]
async fn test_list_tasks_defaults_on_empty_store() {
    let app = create_test_app();

    let (status, json) = send_empty(&app, Method::GET, "/tasks").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"], json!([]));
    assert_eq!(json["page"], 1);
    assert_eq!(json["limit"], 20);
    assert_eq!(json["total_pages"], 0);
}

#[rstest]
#[tokio::test]
async fn test_list_tasks_invalid_query() {
    let app = create_test_app();

    let (status, json) = send_empty(&app, Method::GET, "/tasks?page=first").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
}

// =============================================================================
// GET /tasks/{id}
// =============================================================================

#[rstest]
#[case("/tasks/42", StatusCode::NOT_FOUND, "NOT_FOUND")]
#[case("/tasks/abc", StatusCode::BAD_REQUEST, "BAD_REQUEST")]
#[tokio::test]
async fn test_get_task_errors(#[case] uri: &str, #[case] status: StatusCode, #[case] code: &str) {
    let app = create_test_app();

    let (actual, json) = send_empty(&app, Method::GET, uri).await;

    assert_eq!(actual, status);
    assert_eq!(json["code"], code);
}

// =============================================================================
// PUT / PATCH /tasks/{id}
// =============================================================================

#[rstest]
#[case(Method::PUT)]
#[case(Method::PATCH)]
#[tokio::test]
async fn test_update_writes_only_sent_fields(#[case] method: Method) {
    let app = create_test_app();
    let created = create(&app, json!({ "title": "Write report", "description": "draft" })).await;

    let (status, json) = send_json(&app, method, "/tasks/1", &json!({ "status": "done" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "done");
    assert_eq!(json["title"], "Write report");
    assert_eq!(json["description"], "draft");
    assert_eq!(json["created_at"], created["created_at"]);

    let (_, stored) = send_empty(&app, Method::GET, "/tasks/1").await;
    assert_eq!(stored, json);
}

#[rstest]
#[case(json!({ "id": 9 }), "IMMUTABLE_FIELD", "id")]
#[case(json!({ "updated_at": "2024-01-01T00:00:00Z" }), "IMMUTABLE_FIELD", "updated_at")]
#[case(json!({ "status": 5 }), "TYPE_MISMATCH", "status")]
#[case(json!({ "title": ["a"] }), "TYPE_MISMATCH", "title")]
#[case(json!({ "status": "archived" }), "VALIDATION_ERROR", "status")]
#[tokio::test]
async fn test_update_rejections(#[case] body: Value, #[case] code: &str, #[case] field: &str) {
    let app = create_test_app();
    create(&app, json!({ "title": "t" })).await;

    let (status, json) = send_json(&app, Method::PATCH, "/tasks/1", &body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], code);
    assert_eq!(json["details"][0]["field"], field);
}

#[rstest]
#[tokio::test]
async fn test_update_missing_task() {
    let app = create_test_app();

    let (status, json) =
        send_json(&app, Method::PUT, "/tasks/7", &json!({ "status": "done" })).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
}

#[rstest]
#[tokio::test]
async fn test_update_non_object_body() {
    let app = create_test_app();
    create(&app, json!({ "title": "t" })).await;

    let (status, json) = send_json(&app, Method::PUT, "/tasks/1", &json!(["status"])).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
}

#[rstest]
#[tokio::test]
async fn test_update_with_only_unknown_keys_returns_current_task() {
    let app = create_test_app();
    let created = create(&app, json!({ "title": "t" })).await;

    let (status, json) = send_json(&app, Method::PATCH, "/tasks/1", &json!({ "priority": "high" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, created);
}

// =============================================================================
// DELETE /tasks/{id}
// =============================================================================

#[rstest]
#[tokio::test]
async fn test_delete_task() {
    let app = create_test_app();
    create(&app, json!({ "title": "t" })).await;

    let (status, _) = send_empty(&app, Method::DELETE, "/tasks/1").await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send_empty(&app, Method::GET, "/tasks/1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, json) = send_empty(&app, Method::DELETE, "/tasks/1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
}
