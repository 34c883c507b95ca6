//! Repository trait for the task store.
//!
//! Methods return boxed futures so the trait stays object-safe and handlers
//! can hold any implementation behind `Arc<dyn TaskRepository>`.

use futures::future::BoxFuture;
use thiserror::Error;

use crate::domain::{Assignment, Task, TaskId};

// =============================================================================
// Repository Error
// =============================================================================

/// Errors that can occur during repository operations.
///
/// A missing row is not an error: lookups return `None` and deletes `false`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// The statement failed.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// No connection could be obtained in time, or the pool is closed.
    #[error("Database unavailable: {0}")]
    Unavailable(String),
}

// =============================================================================
// Pagination
// =============================================================================

/// Pagination parameters for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Page number (0-indexed).
    pub page: u32,
    /// Number of items per page.
    pub page_size: u32,
}

impl Pagination {
    /// Creates new pagination parameters.
    ///
    /// # Panics
    ///
    /// Panics if `page_size` is 0.
    #[must_use]
    pub const fn new(page: u32, page_size: u32) -> Self {
        assert!(page_size > 0, "page_size must be greater than 0");
        Self { page, page_size }
    }

    /// Returns the number of rows to skip.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.page as u64 * self.page_size as u64
    }

    /// Returns the maximum number of rows to return.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.page_size
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 0,
            page_size: 20,
        }
    }
}

/// Paginated result containing items and total count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginatedResult<T> {
    /// The items in the current page.
    pub items: Vec<T>,
    /// Total number of items across all pages.
    pub total: u64,
    /// Current page (0-indexed).
    pub page: u32,
    /// Number of items per page.
    pub page_size: u32,
}

impl<T> PaginatedResult<T> {
    /// Creates a new paginated result.
    #[must_use]
    pub const fn new(items: Vec<T>, total: u64, pagination: Pagination) -> Self {
        Self {
            items,
            total,
            page: pagination.page,
            page_size: pagination.page_size,
        }
    }

    /// Returns the total number of pages.
    #[must_use]
    pub const fn total_pages(&self) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        self.total.div_ceil(self.page_size as u64)
    }
}

// =============================================================================
// Task Repository
// =============================================================================

/// Persistent storage for [`Task`] rows.
///
/// # Example
///
/// ```ignore
/// let stored = repository.insert(&draft).await?;
/// let found = repository.find_by_id(stored.id).await?;
/// ```
pub trait TaskRepository: Send + Sync {
    /// Lists tasks ordered by id.
    fn list(&self, pagination: Pagination)
    -> BoxFuture<'_, Result<PaginatedResult<Task>, RepositoryError>>;

    /// Finds a task by its ID.
    ///
    /// Returns `Ok(None)` if no row has this id.
    fn find_by_id(&self, id: TaskId) -> BoxFuture<'_, Result<Option<Task>, RepositoryError>>;

    /// Inserts a new task and returns the stored row.
    ///
    /// The draft's id and timestamps are ignored; the store assigns them.
    fn insert<'a>(&'a self, draft: &'a Task) -> BoxFuture<'a, Result<Task, RepositoryError>>;

    /// Applies `assignments` to task `id` and refreshes `updated_at`.
    ///
    /// Assignments are written in the given order. Returns `Ok(None)` if no
    /// row has this id.
    fn update<'a>(
        &'a self,
        id: TaskId,
        assignments: &'a [Assignment],
    ) -> BoxFuture<'a, Result<Option<Task>, RepositoryError>>;

    /// Deletes a task by its ID.
    ///
    /// Returns `Ok(true)` if the task was deleted, `Ok(false)` if it didn't exist.
    fn delete(&self, id: TaskId) -> BoxFuture<'_, Result<bool, RepositoryError>>;
}

// =============================================================================
// Tests
// =============================================================================
