//! Request guards.
//!
//! Requests that carry a body must declare it as UTF-8 JSON. The check runs
//! before routing so every endpoint answers a wrong media type the same way.

use axum::{
    extract::Request,
    http::{Method, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::error::ApiErrorResponse;

/// Rejects `POST`, `PUT` and `PATCH` requests whose `Content-Type` is not
/// `application/json` with an optional `charset=utf-8` parameter.
pub async fn require_json(request: Request, next: Next) -> Response {
    if !carries_body(request.method()) {
        return next.run(request).await;
    }

    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());

    if content_type.is_some_and(is_json_utf8) {
        return next.run(request).await;
    }

    tracing::debug!(?content_type, method = %request.method(), "Rejected media type");
    ApiErrorResponse::unsupported_media_type(
        "Content-Type must be application/json with charset utf-8",
    )
    .into_response()
}

fn carries_body(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH)
}

/// Returns `true` for `application/json`, optionally with a UTF-8 charset.
///
/// Matching is case-insensitive; other parameters are ignored.
#[must_use]
pub fn is_json_utf8(content_type: &str) -> bool {
    let mut parts = content_type.split(';');
    let essence = parts.next().unwrap_or_default().trim();
    if !essence.eq_ignore_ascii_case("application/json") {
        return false;
    }

    parts
        .filter_map(|parameter| parameter.split_once('='))
        .filter(|(name, _)| name.trim().eq_ignore_ascii_case("charset"))
        .all(|(_, value)| {
            let charset = value.trim().trim_matches('"');
            charset.eq_ignore_ascii_case("utf-8") || charset.eq_ignore_ascii_case("utf8")
        })
}

// =============================================================================
// Tests
// =============================================================================
