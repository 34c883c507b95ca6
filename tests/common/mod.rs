//! Common test helpers for integration tests.
//!
//! # Usage
//!
//! ```ignore
//! mod common;
//! use common::{create_test_app_state, send_json};
//! ```
//!
//! # Note
//!
//! The `#![allow(dead_code)]` attribute is necessary because Rust compiles each
//! integration test file as a separate crate, and not every file uses every helper.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use task_service::api::{AppState, router};
use task_service::domain::{Task, TaskId, Timestamp};
use task_service::infrastructure::InMemoryTaskRepository;

// =============================================================================
// AppState Creation Helpers
// =============================================================================

/// Creates a test `AppState` backed by an empty in-memory repository.
pub fn create_test_app_state() -> AppState {
    AppState::new(Arc::new(InMemoryTaskRepository::new()))
}

/// Creates the full application router over a fresh in-memory repository.
pub fn create_test_app() -> Router {
    router(create_test_app_state())
}

/// Stores a task directly through the repository.
pub async fn create_and_save_task(state: &AppState, title: &str) -> Task {
    let draft = Task::new(TaskId::UNASSIGNED, title, Timestamp::now());
    state
        .task_repository
        .insert(&draft)
        .await
        .expect("insert into in-memory repository")
}

// =============================================================================
// Request Helpers
// =============================================================================

/// Sends a request through the router and decodes the JSON body.
///
/// Returns `Value::Null` for empty bodies.
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    content_type: Option<&str>,
    body: &str,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, json)
}

/// Sends a JSON body with `Content-Type: application/json; charset=utf-8`.
pub async fn send_json(app: &Router, method: Method, uri: &str, body: &Value) -> (StatusCode, Value) {
    send(
        app,
        method,
        uri,
        Some("application/json; charset=utf-8"),
        &body.to_string(),
    )
    .await
}

/// Sends a request without a body.
pub async fn send_empty(app: &Router, method: Method, uri: &str) -> (StatusCode, Value) {
    send(app, method, uri, None, "").await
}
