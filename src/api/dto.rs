//! Data Transfer Objects for API requests and responses.
//!
//! This module contains DTOs that are separate from domain models,
//! providing a clean API contract.

use serde::{Deserialize, Serialize};

use crate::domain::{DEFAULT_STATUS, Task, TaskId, Timestamp};

// =============================================================================
// Task DTOs
// =============================================================================

/// Request DTO for creating a new task.
///
/// A missing title decodes as empty so it is reported by validation rather
/// than as a malformed body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateTaskRequest {
    /// Title of the task.
    #[serde(default)]
    pub title: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Initial status (defaults to `new`; an empty string counts as absent).
    #[serde(default)]
    pub status: Option<String>,
}

impl CreateTaskRequest {
    /// Converts the request into an unsaved task.
    #[must_use]
    pub fn into_draft(self, now: Timestamp) -> Task {
        Task {
            id: TaskId::UNASSIGNED,
            title: self.title,
            description: self.description,
            status: self
                .status
                .filter(|status| !status.is_empty())
                .unwrap_or_else(|| DEFAULT_STATUS.to_string()),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Response DTO for a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskResponse {
    /// Task ID.
    pub id: i32,
    /// Title of the task.
    pub title: String,
    /// Description of the task.
    pub description: Option<String>,
    /// Current status.
    pub status: String,
    /// Creation timestamp (RFC 3339).
    pub created_at: String,
    /// Last update timestamp (RFC 3339).
    pub updated_at: String,
}

impl From<&Task> for TaskResponse {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.get(),
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status.clone(),
            created_at: task.created_at.to_string(),
            updated_at: task.updated_at.to_string(),
        }
    }
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self::from(&task)
    }
}

// =============================================================================
// Tests
// =============================================================================
