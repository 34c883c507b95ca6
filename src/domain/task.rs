//! Task domain model.
//!
//! This module contains the task record, its value objects, and the static
//! schema that drives validation and partial updates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::schema::{
    AssignError, FieldDescriptor, FieldKind, FieldRule, FieldValue, Record, Schema,
    ValidationError,
};

// =============================================================================
// Value Objects - Newtypes
// =============================================================================

/// Identifier of a task, assigned by the store (`SERIAL`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(i32);

impl TaskId {
    /// Placeholder identity of a task that has not been stored yet.
    pub const UNASSIGNED: Self = Self(0);

    /// Creates a `TaskId` from its raw value.
    #[must_use]
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// A timestamp wrapper for `DateTime<Utc>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a `Timestamp` from a `DateTime<Utc>`.
    #[must_use]
    pub const fn from_datetime(datetime: DateTime<Utc>) -> Self {
        Self(datetime)
    }

    /// Returns the inner `DateTime<Utc>`.
    #[must_use]
    pub const fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Returns the current time.
    ///
    /// **Note**: reads the system clock; handlers call it once per request and
    /// pass the value down.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0.to_rfc3339())
    }
}

// =============================================================================
// Schema
// =============================================================================

/// Accepted values of the `status` column.
pub const TASK_STATUSES: &[&str] = &["new", "in_progress", "done"];

/// Status given to tasks created without one.
pub const DEFAULT_STATUS: &str = "new";

/// Largest identifier the `SERIAL` column can hold.
const MAX_TASK_ID: i64 = 2_147_483_647;

const ID_RULES: &[FieldRule] = &[FieldRule::Range {
    min: 0,
    max: MAX_TASK_ID,
}];
const TITLE_RULES: &[FieldRule] = &[FieldRule::Required, FieldRule::MaxLength(200)];
const DESCRIPTION_RULES: &[FieldRule] = &[FieldRule::MaxLength(5000)];
const STATUS_RULES: &[FieldRule] = &[FieldRule::OneOf(TASK_STATUSES)];

const TASK_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("id", FieldKind::Integer)
        .identity()
        .rules(ID_RULES),
    FieldDescriptor::new("title", FieldKind::String)
        .rules(TITLE_RULES)
        .placeholder("placeholder"),
    FieldDescriptor::new("description", FieldKind::OptionalString).rules(DESCRIPTION_RULES),
    FieldDescriptor::new("status", FieldKind::String).rules(STATUS_RULES),
    FieldDescriptor::new("created_at", FieldKind::Timestamp).immutable(),
    FieldDescriptor::new("updated_at", FieldKind::Timestamp).immutable(),
];

/// Schema of the `tasks` table.
pub static TASK_SCHEMA: Schema = Schema::new("tasks", TASK_FIELDS);

// =============================================================================
// Task Entity
// =============================================================================

/// A row of the `tasks` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Store-assigned identifier.
    pub id: TaskId,
    /// Title (required).
    pub title: String,
    /// Optional free-form description.
    pub description: Option<String>,
    /// One of [`TASK_STATUSES`].
    pub status: String,
    /// Creation time.
    pub created_at: Timestamp,
    /// Last modification time.
    pub updated_at: Timestamp,
}

impl Task {
    /// Creates a task with the default status and no description.
    #[must_use]
    pub fn new(id: TaskId, title: impl Into<String>, timestamp: Timestamp) -> Self {
        Self {
            id,
            title: title.into(),
            description: None,
            status: DEFAULT_STATUS.to_string(),
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Returns a copy with the given description.
    #[must_use]
    pub fn with_description(self, description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..self
        }
    }

    /// Returns a copy with the given status.
    #[must_use]
    pub fn with_status(self, status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            ..self
        }
    }

    /// Base record for a partial update of task `id`.
    ///
    /// Every field the client omits keeps a value that passes validation:
    /// the title is left blank for the schema placeholder to fill.
    #[must_use]
    pub fn update_base(id: TaskId, timestamp: Timestamp) -> Self {
        Self::new(id, String::new(), timestamp)
    }

    /// Validates the task against [`TASK_SCHEMA`].
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] listing every violated rule.
    pub fn validate(&self) -> Result<(), ValidationError> {
        TASK_SCHEMA.validate(self)
    }
}

impl Record for Task {
    fn schema() -> &'static Schema {
        &TASK_SCHEMA
    }

    fn value(&self, field: &str) -> Option<FieldValue> {
        let value = match field {
            "id" => FieldValue::Integer(i64::from(self.id.get())),
            "title" => FieldValue::Text(self.title.clone()),
            "description" => FieldValue::OptionalText(self.description.clone()),
            "status" => FieldValue::Text(self.status.clone()),
            "created_at" => FieldValue::Timestamp(*self.created_at.as_datetime()),
            "updated_at" => FieldValue::Timestamp(*self.updated_at.as_datetime()),
            _ => return None,
        };
        Some(value)
    }

    fn assign(&mut self, field: &str, value: FieldValue) -> Result<(), AssignError> {
        match (field, value) {
            ("id", FieldValue::Integer(raw)) => {
                let id = i32::try_from(raw).map_err(|_| AssignError::Rejected {
                    field: field.to_string(),
                    found: FieldKind::Integer,
                })?;
                self.id = TaskId::new(id);
            }
            ("title", FieldValue::Text(title)) => self.title = title,
            ("description", FieldValue::OptionalText(description)) => {
                self.description = description;
            }
            ("status", FieldValue::Text(status)) => self.status = status,
            ("created_at", FieldValue::Timestamp(at)) => self.created_at = Timestamp::from_datetime(at),
            ("updated_at", FieldValue::Timestamp(at)) => self.updated_at = Timestamp::from_datetime(at),
            (field, value) if TASK_SCHEMA.field(field).is_some() => {
                return Err(AssignError::Rejected {
                    field: field.to_string(),
                    found: value.kind(),
                });
            }
            (field, _) => return Err(AssignError::UnknownField(field.to_string())),
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
