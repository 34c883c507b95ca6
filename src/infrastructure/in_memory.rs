//! In-memory repository implementation.
//!
//! Stores tasks in a `BTreeMap` keyed by id behind a `tokio` `RwLock`, and
//! hands out ids from a counter the way a `SERIAL` column does. Suitable for
//! development and tests.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::sync::RwLock;

use crate::domain::{Assignment, Record, Task, TaskId, Timestamp};
use crate::infrastructure::{PaginatedResult, Pagination, RepositoryError, TaskRepository};

#[derive(Debug)]
struct Table {
    rows: BTreeMap<TaskId, Task>,
    last_id: i32,
}

/// In-memory implementation of `TaskRepository`.
///
/// Cloning shares the underlying table.
///
/// # Example
///
/// ```ignore
/// let repository = InMemoryTaskRepository::new();
/// let stored = repository.insert(&Task::new(TaskId::UNASSIGNED, "Write report", Timestamp::now())).await?;
/// assert_eq!(stored.id, TaskId::new(1));
/// ```
#[derive(Debug, Clone)]
pub struct InMemoryTaskRepository {
    table: Arc<RwLock<Table>>,
}

impl InMemoryTaskRepository {
    /// Creates a new empty in-memory task repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: Arc::new(RwLock::new(Table {
                rows: BTreeMap::new(),
                last_id: 0,
            })),
        }
    }
}

impl Default for InMemoryTaskRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(clippy::significant_drop_tightening)]
impl TaskRepository for InMemoryTaskRepository {
    fn list(
        &self,
        pagination: Pagination,
    ) -> BoxFuture<'_, Result<PaginatedResult<Task>, RepositoryError>> {
        Box::pin(async move {
            let guard = self.table.read().await;

            let total = guard.rows.len() as u64;
            let offset = usize::try_from(pagination.offset()).unwrap_or(usize::MAX);
            let limit = pagination.limit() as usize;

            let items: Vec<Task> = guard
                .rows
                .values()
                .skip(offset)
                .take(limit)
                .cloned()
                .collect();

            Ok(PaginatedResult::new(items, total, pagination))
        })
    }

    fn find_by_id(&self, id: TaskId) -> BoxFuture<'_, Result<Option<Task>, RepositoryError>> {
        Box::pin(async move {
            let guard = self.table.read().await;
            Ok(guard.rows.get(&id).cloned())
        })
    }

    fn insert<'a>(&'a self, draft: &'a Task) -> BoxFuture<'a, Result<Task, RepositoryError>> {
        Box::pin(async move {
            let mut guard = self.table.write().await;

            let next = guard.last_id.checked_add(1).ok_or_else(|| {
                RepositoryError::DatabaseError("id sequence exhausted".to_string())
            })?;
            guard.last_id = next;

            let now = Timestamp::now();
            let task = Task {
                id: TaskId::new(next),
                created_at: now,
                updated_at: now,
                ..draft.clone()
            };
            guard.rows.insert(task.id, task.clone());
            Ok(task)
        })
    }

    fn update<'a>(
        &'a self,
        id: TaskId,
        assignments: &'a [Assignment],
    ) -> BoxFuture<'a, Result<Option<Task>, RepositoryError>> {
        Box::pin(async move {
            let mut guard = self.table.write().await;
            let Some(current) = guard.rows.get(&id) else {
                return Ok(None);
            };

            // Apply to a copy so a rejected assignment leaves the row untouched.
            let mut updated = current.clone();
            for assignment in assignments {
                updated
                    .assign(assignment.column, assignment.value.clone())
                    .map_err(|error| RepositoryError::DatabaseError(error.to_string()))?;
            }
            updated.updated_at = Timestamp::now();

            guard.rows.insert(id, updated.clone());
            Ok(Some(updated))
        })
    }

    fn delete(&self, id: TaskId) -> BoxFuture<'_, Result<bool, RepositoryError>> {
        Box::pin(async move {
            let mut guard = self.table.write().await;
            Ok(guard.rows.remove(&id).is_some())
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
