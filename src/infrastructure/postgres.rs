//! `PostgreSQL` repository implementation.
//!
//! Tasks live in a plain relational table; the update statement is generated
//! from the resolver's assignments so only the columns a client sent are
//! written.
//!
//! # Table Schema
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS tasks (
//!     id SERIAL PRIMARY KEY,
//!     title TEXT NOT NULL,
//!     description TEXT,
//!     status TEXT NOT NULL DEFAULT 'new'
//!         CHECK (status IN ('new', 'in_progress', 'done')),
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use sqlx::PgPool;
use sqlx::postgres::{PgArguments, Postgres};
use sqlx::query::QueryAs;

use crate::domain::{Assignment, FieldValue, Schema, TASK_SCHEMA, Task, TaskId, Timestamp};
use crate::infrastructure::{PaginatedResult, Pagination, RepositoryError, TaskRepository};

const CREATE_TASKS_TABLE: &str = "\
CREATE TABLE IF NOT EXISTS tasks (
    id SERIAL PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT,
    status TEXT NOT NULL DEFAULT 'new'
        CHECK (status IN ('new', 'in_progress', 'done')),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)";

const TASK_COLUMNS: &str = "id, title, description, status, created_at, updated_at";

/// Server-managed column refreshed by every update.
const TOUCH_COLUMN: &str = "updated_at";

type TaskRow = (
    i32,
    String,
    Option<String>,
    String,
    DateTime<Utc>,
    DateTime<Utc>,
);

fn task_from_row(row: TaskRow) -> Task {
    let (id, title, description, status, created_at, updated_at) = row;
    Task {
        id: TaskId::new(id),
        title,
        description,
        status,
        created_at: Timestamp::from_datetime(created_at),
        updated_at: Timestamp::from_datetime(updated_at),
    }
}

impl From<sqlx::Error> for RepositoryError {
    fn from(error: sqlx::Error) -> Self {
        if matches!(error, sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed) {
            Self::Unavailable(error.to_string())
        } else {
            Self::DatabaseError(error.to_string())
        }
    }
}

/// Creates the `tasks` table if it does not exist yet.
///
/// # Errors
///
/// Returns `RepositoryError` if the statement fails.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), RepositoryError> {
    sqlx::query(CREATE_TASKS_TABLE).execute(pool).await?;
    tracing::info!(table = TASK_SCHEMA.table(), "Schema ensured");
    Ok(())
}

// =============================================================================
// Statement Generation
// =============================================================================

/// Builds the `UPDATE` statement for `assignments`.
///
/// Assignments become positional parameters `$1..$n` in the order given, the
/// schema's `updated_at` column (if any) is set to `NOW()`, and the identity is
/// bound as `$n+1`. The statement returns the updated row.
///
/// # Errors
///
/// Returns `RepositoryError::DatabaseError` if `assignments` is empty or
/// names a column that is not a mutable field of `schema`.
pub fn build_update_statement(
    schema: &Schema,
    assignments: &[Assignment],
) -> Result<String, RepositoryError> {
    if assignments.is_empty() {
        return Err(RepositoryError::DatabaseError(
            "update without assignments".to_string(),
        ));
    }

    let mut clauses = Vec::with_capacity(assignments.len() + 1);
    for (index, assignment) in assignments.iter().enumerate() {
        let writable = schema
            .field(assignment.column)
            .is_some_and(|field| field.mutable);
        if !writable {
            return Err(RepositoryError::DatabaseError(format!(
                "column '{}' is not writable",
                assignment.column
            )));
        }
        clauses.push(format!("{} = ${}", assignment.column, index + 1));
    }
    if schema.field(TOUCH_COLUMN).is_some() {
        clauses.push(format!("{TOUCH_COLUMN} = NOW()"));
    }

    let returning: Vec<&str> = schema.fields().iter().map(|field| field.name).collect();

    Ok(format!(
        "UPDATE {} SET {} WHERE {} = ${} RETURNING {}",
        schema.table(),
        clauses.join(", "),
        schema.identity().name,
        assignments.len() + 1,
        returning.join(", "),
    ))
}

fn bind_value<'q, O>(
    query: QueryAs<'q, Postgres, O, PgArguments>,
    value: &FieldValue,
) -> QueryAs<'q, Postgres, O, PgArguments> {
    match value {
        FieldValue::Integer(number) => query.bind(*number),
        FieldValue::Text(text) => query.bind(text.clone()),
        FieldValue::OptionalText(text) => query.bind(text.clone()),
        FieldValue::Timestamp(at) => query.bind(*at),
    }
}

// =============================================================================
// PostgreSQL Task Repository
// =============================================================================

/// `PostgreSQL` implementation of `TaskRepository`.
///
/// # Example
///
/// ```ignore
/// let pool = PgPool::connect("postgres://localhost/tasks").await?;
/// ensure_schema(&pool).await?;
/// let repository = PostgresTaskRepository::new(pool);
/// ```
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    /// Connection pool for `PostgreSQL`.
    pool: PgPool,
}

impl PostgresTaskRepository {
    /// Creates a new `PostgreSQL` task repository with the given connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl TaskRepository for PostgresTaskRepository {
    fn list(
        &self,
        pagination: Pagination,
    ) -> BoxFuture<'_, Result<PaginatedResult<Task>, RepositoryError>> {
        Box::pin(async move {
            let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks")
                .fetch_one(&self.pool)
                .await?;
            let total = u64::try_from(count).unwrap_or_default();

            if total == 0 {
                return Ok(PaginatedResult::new(vec![], 0, pagination));
            }

            let offset = i64::try_from(pagination.offset()).unwrap_or(i64::MAX);
            let rows: Vec<TaskRow> = sqlx::query_as(&format!(
                "SELECT {TASK_COLUMNS} FROM tasks ORDER BY id ASC LIMIT $1 OFFSET $2"
            ))
            .bind(i64::from(pagination.limit()))
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

            let items = rows.into_iter().map(task_from_row).collect();
            Ok(PaginatedResult::new(items, total, pagination))
        })
    }

    fn find_by_id(&self, id: TaskId) -> BoxFuture<'_, Result<Option<Task>, RepositoryError>> {
        Box::pin(async move {
            let row: Option<TaskRow> =
                sqlx::query_as(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"))
                    .bind(id.get())
                    .fetch_optional(&self.pool)
                    .await?;

            Ok(row.map(task_from_row))
        })
    }

    fn insert<'a>(&'a self, draft: &'a Task) -> BoxFuture<'a, Result<Task, RepositoryError>> {
        Box::pin(async move {
            let row: TaskRow = sqlx::query_as(&format!(
                "INSERT INTO tasks (title, description, status) VALUES ($1, $2, $3) \
                 RETURNING {TASK_COLUMNS}"
            ))
            .bind(&draft.title)
            .bind(&draft.description)
            .bind(&draft.status)
            .fetch_one(&self.pool)
            .await?;

            Ok(task_from_row(row))
        })
    }

    fn update<'a>(
        &'a self,
        id: TaskId,
        assignments: &'a [Assignment],
    ) -> BoxFuture<'a, Result<Option<Task>, RepositoryError>> {
        Box::pin(async move {
            let statement = build_update_statement(&TASK_SCHEMA, assignments)?;
            tracing::debug!(%statement, "Executing partial update");

            let query = assignments
                .iter()
                .fold(sqlx::query_as::<_, TaskRow>(&statement), |query, assignment| {
                    bind_value(query, &assignment.value)
                });
            let row = query.bind(id.get()).fetch_optional(&self.pool).await?;

            Ok(row.map(task_from_row))
        })
    }

    fn delete(&self, id: TaskId) -> BoxFuture<'_, Result<bool, RepositoryError>> {
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
                .bind(id.get())
                .execute(&self.pool)
                .await?;

            Ok(result.rows_affected() > 0)
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
