//! Domain module for task management.
//!
//! This module contains the record schemas, the task model, and the partial
//! update resolver. Nothing here performs I/O.

pub mod schema;
pub mod task;
pub mod update;

pub use schema::{
    AssignError, FieldDescriptor, FieldKind, FieldRule, FieldValue, Record, Schema,
    ValidationError, Violation,
};
pub use task::{DEFAULT_STATUS, TASK_SCHEMA, TASK_STATUSES, Task, TaskId, Timestamp};
pub use update::{Assignment, ResolvedUpdate, SparseMap, UpdateError, resolve};
