//! API module for HTTP handlers.
//!
//! This module contains route definitions and request/response handlers.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod query;
pub mod transaction;

use std::any::Any;

use axum::Router;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

pub use dto::{CreateTaskRequest, TaskResponse};
pub use error::{ApiError, ApiErrorResponse, FieldError};
pub use handlers::{
    AppConfig, AppState, HealthResponse, TaskPath, create_task, delete_task, get_task,
    health_check,
};
pub use middleware::{is_json_utf8, require_json};
pub use query::{ListTasksQuery, PaginatedResponse, list_tasks};
pub use transaction::update_task;

/// Builds the application router.
///
/// Layers, outermost first: request tracing, panic recovery (a panicking
/// handler answers 500), then the JSON content-type guard.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/{id}",
            get(get_task)
                .put(update_task)
                .patch(update_task)
                .delete(delete_task),
        )
        .layer(axum::middleware::from_fn(require_json))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    tracing::error!(panic = message, "Handler panicked");

    ApiErrorResponse::internal_error("An internal error occurred").into_response()
}
