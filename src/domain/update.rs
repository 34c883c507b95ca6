//! Sparse partial-update resolution.
//!
//! [`resolve`] merges a sparse, client-supplied map of field values into a
//! base record and produces the ordered list of column assignments a
//! `SET` clause needs. It is pure: no I/O, no shared state, and the output
//! order depends only on the record's [`Schema`](super::schema::Schema), never
//! on the input map.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use task_service::domain::{Task, TaskId, Timestamp, resolve};
//!
//! let changes = json!({ "description": "urgent", "status": "done" });
//! let base = Task::update_base(TaskId::new(7), Timestamp::now());
//!
//! let resolved = resolve(base, changes.as_object().unwrap()).unwrap();
//! assert_eq!(resolved.columns().collect::<Vec<_>>(), ["description", "status"]);
//! ```

use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;

use super::schema::{FieldDescriptor, FieldKind, FieldValue, Record, ValidationError};

/// Client-supplied field values keyed by field name, as decoded from a request body.
pub type SparseMap = serde_json::Map<String, Value>;

// =============================================================================
// Resolved Update
// =============================================================================

/// One `column = value` pair of an update statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// Column (field) name.
    pub column: &'static str,
    /// Value coerced to the column's declared kind.
    pub value: FieldValue,
}

/// Outcome of a successful [`resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUpdate<R> {
    /// Requested assignments in schema declaration order.
    pub assignments: Vec<Assignment>,
    /// The validated merge of the base record and the requested values.
    pub record: R,
}

impl<R> ResolvedUpdate<R> {
    /// Returns the column names in parameter order.
    pub fn columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.assignments.iter().map(|assignment| assignment.column)
    }

    /// Returns the values in parameter order.
    pub fn values(&self) -> impl Iterator<Item = &FieldValue> {
        self.assignments.iter().map(|assignment| &assignment.value)
    }

    /// Returns `true` if the client requested no writable change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Reasons a partial update is rejected. All are client errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpdateError {
    /// The client tried to change an immutable field.
    #[error("field '{field}' cannot be updated")]
    ImmutableField {
        /// Field name.
        field: &'static str,
    },

    /// The supplied value does not have the field's declared kind.
    #[error("field '{field}' must be {expected}")]
    TypeMismatch {
        /// Field name.
        field: &'static str,
        /// Declared kind.
        expected: FieldKind,
    },

    /// The merged record breaks one or more validation rules.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl UpdateError {
    /// Returns the offending field for single-field errors.
    #[must_use]
    pub const fn field(&self) -> Option<&'static str> {
        match self {
            Self::ImmutableField { field } | Self::TypeMismatch { field, .. } => Some(*field),
            Self::Validation(_) => None,
        }
    }

    const fn mismatch(field: &FieldDescriptor) -> Self {
        Self::TypeMismatch {
            field: field.name,
            expected: field.kind,
        }
    }
}

// =============================================================================
// Resolver
// =============================================================================

/// Merges `changes` into `base` and returns the assignments to persist.
///
/// Fields are visited in the order [`Record::schema`] declares them:
///
/// 1. any immutable field present in `changes` rejects the whole update;
/// 2. each present mutable field is coerced to its declared kind, set on the
///    merged record and appended to the assignment list;
/// 3. each absent field that declares a placeholder gets it on the merged
///    record when its current value is empty, without producing an assignment;
/// 4. the merged record is validated as a whole.
///
/// Keys that are not schema fields are ignored.
///
/// # Errors
///
/// - [`UpdateError::ImmutableField`] if `changes` names an immutable field
/// - [`UpdateError::TypeMismatch`] if a value cannot be coerced
/// - [`UpdateError::Validation`] if the merged record is invalid
pub fn resolve<R: Record>(base: R, changes: &SparseMap) -> Result<ResolvedUpdate<R>, UpdateError> {
    let fields = R::schema().fields();

    if let Some(field) = fields
        .iter()
        .find(|field| !field.mutable && changes.contains_key(field.name))
    {
        return Err(UpdateError::ImmutableField { field: field.name });
    }

    let mut record = base;
    let mut assignments = Vec::new();

    for field in fields {
        match changes.get(field.name) {
            Some(raw) => {
                let value = coerce(field, raw)?;
                record
                    .assign(field.name, value.clone())
                    .map_err(|_| UpdateError::mismatch(field))?;
                assignments.push(Assignment {
                    column: field.name,
                    value,
                });
            }
            None => fill_placeholder(field, &mut record)?,
        }
    }

    R::schema().validate(&record)?;

    Ok(ResolvedUpdate {
        assignments,
        record,
    })
}

/// Coerces a raw JSON value to the field's declared kind.
///
/// No implicit conversions: integers must be JSON integers, text must be JSON
/// strings, and `null` is never accepted.
fn coerce(field: &FieldDescriptor, raw: &Value) -> Result<FieldValue, UpdateError> {
    let value = match (field.kind, raw) {
        (FieldKind::Integer, Value::Number(number)) => number.as_i64().map(FieldValue::Integer),
        (FieldKind::String, Value::String(text)) => Some(FieldValue::Text(text.clone())),
        (FieldKind::OptionalString, Value::String(text)) => {
            Some(FieldValue::OptionalText(Some(text.clone())))
        }
        (FieldKind::Timestamp, Value::String(text)) => DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|timestamp| FieldValue::Timestamp(timestamp.with_timezone(&Utc))),
        _ => None,
    };

    value.ok_or_else(|| UpdateError::mismatch(field))
}

fn fill_placeholder<R: Record>(field: &FieldDescriptor, record: &mut R) -> Result<(), UpdateError> {
    let Some(placeholder) = field
        .placeholder
        .and_then(|text| FieldValue::from_placeholder(field.kind, text))
    else {
        return Ok(());
    };

    if record.value(field.name).is_none_or(|current| current.is_empty()) {
        record
            .assign(field.name, placeholder)
            .map_err(|_| UpdateError::mismatch(field))?;
    }

    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
