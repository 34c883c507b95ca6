//! Task listing.
//!
//! Pages are 1-indexed on the wire and 0-indexed in the repository.

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use serde::{Deserialize, Serialize};

use super::dto::TaskResponse;
use super::error::ApiErrorResponse;
use super::handlers::{AppConfig, AppState};
use crate::domain::Task;
use crate::infrastructure::{PaginatedResult, Pagination};

// =============================================================================
// List Pagination Constants
// =============================================================================

/// Maximum page size for list operations (prevents full table scans).
pub const MAX_PAGE_SIZE: u32 = 100;

/// Default page size for list operations.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

// =============================================================================
// Query Parameters
// =============================================================================

/// Query parameters for `GET /tasks`.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ListTasksQuery {
    /// Page number (default: 1, minimum: 1).
    pub page: Option<u32>,
    /// Items per page (default and upper bound from [`AppConfig`]).
    pub limit: Option<u32>,
}

impl ListTasksQuery {
    /// Normalizes the query into repository pagination.
    ///
    /// The limit is clamped to `1..=max_page_size` and page 0 is treated as 1.
    #[must_use]
    pub fn pagination(&self, config: &AppConfig) -> Pagination {
        let max_page_size = config.max_page_size.max(1);
        let page_size = self
            .limit
            .unwrap_or(config.default_page_size)
            .clamp(1, max_page_size);
        let page = self.page.unwrap_or(1).saturating_sub(1);
        Pagination::new(page, page_size)
    }
}

/// Paginated response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    /// The data items for the current page.
    pub data: Vec<T>,
    /// Current page number (1-indexed).
    pub page: u32,
    /// Items per page.
    pub limit: u32,
    /// Total number of items.
    pub total: u64,
    /// Total number of pages (0 if no items).
    pub total_pages: u64,
}

// =============================================================================
// GET /tasks Handler
// =============================================================================

/// Lists tasks ordered by id.
///
/// # Query Parameters
///
/// - `page`: page number, 1-indexed (default 1)
/// - `limit`: items per page, clamped to `1..=100` (default 20)
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] if the query string is malformed or the
/// repository fails.
pub async fn list_tasks(
    State(state): State<AppState>,
    query: Result<Query<ListTasksQuery>, QueryRejection>,
) -> Result<Json<PaginatedResponse<TaskResponse>>, ApiErrorResponse> {
    let Query(query) = query?;
    let pagination = query.pagination(&state.config);

    let result = state.task_repository.list(pagination).await?;

    Ok(Json(build_paginated_response(result)))
}

/// Converts a [`PaginatedResult`] to a [`PaginatedResponse`].
fn build_paginated_response(result: PaginatedResult<Task>) -> PaginatedResponse<TaskResponse> {
    let total_pages = result.total_pages();
    let total = result.total;
    let page = result.page.saturating_add(1);
    let limit = result.page_size;

    let data = result.items.into_iter().map(TaskResponse::from).collect();

    PaginatedResponse {
        data,
        page,
        limit,
        total,
        total_pages,
    }
}

// =============================================================================
// Tests
// =============================================================================
