//! HTTP handlers for single-task operations.
//!
//! Handlers validate input, call the repository, and convert results into
//! DTOs. Every failure is returned as an [`ApiErrorResponse`].

use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use serde::Deserialize;

use super::dto::{CreateTaskRequest, TaskResponse};
use super::error::ApiErrorResponse;
use super::query::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::domain::{TaskId, Timestamp};
use crate::infrastructure::TaskRepository;

// =============================================================================
// Application Configuration
// =============================================================================

/// Application configuration for runtime settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    /// Page size used when a list request gives none.
    pub default_page_size: u32,
    /// Upper bound for the requested page size.
    pub max_page_size: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

// =============================================================================
// Application State
// =============================================================================

/// Shared application dependencies.
///
/// Uses a trait object so the backend chosen by `RepositoryFactory` can be
/// swapped at startup.
#[derive(Clone)]
pub struct AppState {
    /// Task repository for persistence.
    pub task_repository: Arc<dyn TaskRepository>,
    /// Application configuration.
    pub config: AppConfig,
}

impl AppState {
    /// Creates a new `AppState` with the default configuration.
    #[must_use]
    pub fn new(task_repository: Arc<dyn TaskRepository>) -> Self {
        Self::with_config(task_repository, AppConfig::default())
    }

    /// Creates a new `AppState` with a custom configuration.
    #[must_use]
    pub const fn with_config(task_repository: Arc<dyn TaskRepository>, config: AppConfig) -> Self {
        Self {
            task_repository,
            config,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("AppState")
            .field("task_repository", &"Arc<dyn TaskRepository>")
            .field("config", &self.config)
            .finish()
    }
}

// =============================================================================
// Path Extractors
// =============================================================================

/// Path parameter for task ID.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TaskPath {
    /// The task ID.
    pub id: i32,
}

// =============================================================================
// POST /tasks Handler
// =============================================================================

/// Creates a new task.
///
/// # Request Body
///
/// ```json
/// {
///   "title": "Task title",
///   "description": "Optional description",
///   "status": "new|in_progress|done"
/// }
/// ```
///
/// # Response
///
/// - **201 Created**: Task created successfully
/// - **400 Bad Request**: Malformed body or validation error
/// - **500 Internal Server Error**: Database error
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] if the body is malformed, the task fails
/// validation, or the repository fails.
pub async fn create_task(
    State(state): State<AppState>,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TaskResponse>), ApiErrorResponse> {
    let Json(request) = payload?;

    let draft = request.into_draft(Timestamp::now());
    draft.validate()?;

    let task = state.task_repository.insert(&draft).await?;
    tracing::info!(task_id = %task.id, "Task created");

    Ok((StatusCode::CREATED, Json(TaskResponse::from(task))))
}

// =============================================================================
// GET /tasks/{id} Handler
// =============================================================================

/// Returns a single task.
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] with 404 if the task does not exist.
pub async fn get_task(
    State(state): State<AppState>,
    path: Result<Path<TaskPath>, PathRejection>,
) -> Result<Json<TaskResponse>, ApiErrorResponse> {
    let Path(TaskPath { id }) = path?;
    let id = TaskId::new(id);

    let task = state
        .task_repository
        .find_by_id(id)
        .await?
        .ok_or_else(|| task_not_found(id))?;

    Ok(Json(TaskResponse::from(task)))
}

// =============================================================================
// DELETE /tasks/{id} Handler
// =============================================================================

/// Deletes a task.
///
/// # Response
///
/// - **204 No Content**: Task deleted
/// - **404 Not Found**: Task does not exist
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] with 404 if the task does not exist.
pub async fn delete_task(
    State(state): State<AppState>,
    path: Result<Path<TaskPath>, PathRejection>,
) -> Result<StatusCode, ApiErrorResponse> {
    let Path(TaskPath { id }) = path?;
    let id = TaskId::new(id);

    if state.task_repository.delete(id).await? {
        tracing::info!(task_id = %id, "Task deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(task_not_found(id))
    }
}

pub(super) fn task_not_found(id: TaskId) -> ApiErrorResponse {
    ApiErrorResponse::not_found(format!("Task {id} not found"))
}

// =============================================================================
// GET /health Handler
// =============================================================================

/// Health check response body.
#[derive(Debug, Clone, serde::Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
}

/// Health check endpoint.
///
/// # Response
///
/// - **200 OK**: Service is healthy
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0"
/// }
/// ```
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// =============================================================================
// Tests
// =============================================================================
