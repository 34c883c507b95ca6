//! Partial task updates.
//!
//! `PUT /tasks/{id}` and `PATCH /tasks/{id}` both accept a sparse JSON object:
//! only the fields it names are written, in schema order. The request is
//! resolved against a base task before any I/O, so a rejected body never
//! reaches the store.

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};

use super::dto::TaskResponse;
use super::error::ApiErrorResponse;
use super::handlers::{AppState, TaskPath, task_not_found};
use crate::domain::{SparseMap, Task, TaskId, Timestamp, resolve};

/// Applies a sparse update to a task.
///
/// # Request Body
///
/// ```json
/// { "description": "urgent", "status": "done" }
/// ```
///
/// Keys that are not task fields are ignored. A body that names no writable
/// field performs no write and returns the current task.
///
/// # Response
///
/// - **200 OK**: The stored task after the update
/// - **400 Bad Request**: `IMMUTABLE_FIELD`, `TYPE_MISMATCH`, `VALIDATION_ERROR`
///   or a malformed body
/// - **404 Not Found**: Task does not exist
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] as listed above, or a 500/503 when the
/// repository fails.
pub async fn update_task(
    State(state): State<AppState>,
    path: Result<Path<TaskPath>, PathRejection>,
    payload: Result<Json<SparseMap>, JsonRejection>,
) -> Result<Json<TaskResponse>, ApiErrorResponse> {
    let Path(TaskPath { id }) = path?;
    let Json(changes) = payload?;
    let id = TaskId::new(id);

    let resolved = resolve(Task::update_base(id, Timestamp::now()), &changes)?;

    if resolved.is_empty() {
        tracing::debug!(task_id = %id, "Update names no writable field");
        let task = state
            .task_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| task_not_found(id))?;
        return Ok(Json(TaskResponse::from(task)));
    }

    let task = state
        .task_repository
        .update(id, &resolved.assignments)
        .await?
        .ok_or_else(|| task_not_found(id))?;

    tracing::info!(
        task_id = %id,
        columns = ?resolved.columns().collect::<Vec<_>>(),
        "Task updated"
    );

    Ok(Json(TaskResponse::from(task)))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::dto::CreateTaskRequest;
    use crate::api::handlers::create_task;
    use crate::infrastructure::InMemoryTaskRepository;
    use axum::http::StatusCode;
    use rstest::{fixture, rstest};
    use serde_json::{Value, json};
    use std::sync::Arc;

    #[fixture]
    fn state() -> AppState {
        AppState::new(Arc::new(InMemoryTaskRepository::new()))
    }

    async fn seed(state: &AppState) -> TaskResponse {
        let request = CreateTaskRequest {
            title: "Write report".to_string(),
            ..CreateTaskRequest::default()
        };
        let (_, Json(response)) = create_task(State(state.clone()), Ok(Json(request)))
            .await
            .unwrap();
        response
    }

    async fn update(
        state: &AppState,
        id: i32,
        body: Value,
    ) -> Result<TaskResponse, ApiErrorResponse> {
        let changes = body.as_object().cloned().unwrap_or_default();
        update_task(State(state.clone()), Ok(Path(TaskPath { id })), Ok(Json(changes)))
            .await
            .map(|Json(response)| response)
    }

    #[rstest]
    #[tokio::test]
    async fn test_update_writes_only_named_fields(state: AppState) {
        let created = seed(&state).await;

        let updated = update(&state, created.id, json!({ "status": "in_progress" }))
            .await
            .unwrap();

        assert_eq!(updated.status, "in_progress");
        assert_eq!(updated.title, "Write report");
        assert_eq!(updated.created_at, created.created_at);
    }

    #[rstest]
    #[tokio::test]
    async fn test_update_empty_body_returns_current_task(state: AppState) {
        let created = seed(&state).await;

        let current = update(&state, created.id, json!({})).await.unwrap();
        assert_eq!(current, created);
    }

    #[rstest]
    #[tokio::test]
    async fn test_update_with_only_unknown_keys_writes_nothing(state: AppState) {
        let created = seed(&state).await;

        let current = update(&state, created.id, json!({ "priority": "high" }))
            .await
            .unwrap();

        assert_eq!(current.updated_at, created.updated_at);
        assert_eq!(current, created);
    }

    #[rstest]
    #[tokio::test]
    async fn test_update_missing_task(state: AppState) {
        let error = update(&state, 99, json!({ "status": "done" }))
            .await
            .unwrap_err();
        assert_eq!(error.status, StatusCode::NOT_FOUND);

        let error = update(&state, 99, json!({})).await.unwrap_err();
        assert_eq!(error.status, StatusCode::NOT_FOUND);
    }

    #[rstest]
    #[case(json!({ "id": 9 }), "IMMUTABLE_FIELD")]
    #[case(json!({ "created_at": "2024-01-01T00:00:00Z" }), "IMMUTABLE_FIELD")]
    #[case(json!({ "status": 5 }), "TYPE_MISMATCH")]
    #[case(json!({ "description": null }), "TYPE_MISMATCH")]
    #[case(json!({ "status": "archived" }), "VALIDATION_ERROR")]
    #[case(json!({ "title": "" }), "VALIDATION_ERROR")]
    #[tokio::test]
    async fn test_update_rejections_leave_task_untouched(
        state: AppState,
        #[case] body: Value,
        #[case] code: &str,
    ) {
        let created = seed(&state).await;

        let error = update(&state, created.id, body).await.unwrap_err();
        assert_eq!(error.status, StatusCode::BAD_REQUEST);
        assert_eq!(error.error.code, code);

        let current = update(&state, created.id, json!({})).await.unwrap();
        assert_eq!(current, created);
    }

    #[rstest]
    #[tokio::test]
    async fn test_update_negative_id_is_rejected(state: AppState) {
        let error = update(&state, -1, json!({ "status": "done" }))
            .await
            .unwrap_err();
        assert_eq!(error.error.code, "VALIDATION_ERROR");
    }
}
