//! Static record schemas.
//!
//! A [`Schema`] lists the fields of a record type in declaration order,
//! together with their kind, mutability and validation rules. Schemas are
//! assembled from `const fn` builders so they can live in `static` items; a
//! descriptor that breaks the identity invariant fails const evaluation
//! instead of surfacing at runtime.
//!
//! Record types opt in by implementing [`Record`], which replaces runtime
//! field reflection with explicit `value` / `assign` accessors keyed by the
//! field name.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

// =============================================================================
// Field Kinds and Values
// =============================================================================

/// Storage kind of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Signed integer column.
    Integer,
    /// Non-nullable text column.
    String,
    /// Nullable text column.
    OptionalString,
    /// Timestamp column (UTC).
    Timestamp,
}

impl FieldKind {
    /// Returns a human-readable name used in error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Integer => "an integer",
            Self::String | Self::OptionalString => "a string",
            Self::Timestamp => "an RFC 3339 timestamp",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// A typed field value, ready to be bound to a statement parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Value of an [`FieldKind::Integer`] field.
    Integer(i64),
    /// Value of a [`FieldKind::String`] field.
    Text(String),
    /// Value of a [`FieldKind::OptionalString`] field.
    OptionalText(Option<String>),
    /// Value of a [`FieldKind::Timestamp`] field.
    Timestamp(DateTime<Utc>),
}

impl FieldValue {
    /// Returns the kind this value belongs to.
    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        match self {
            Self::Integer(_) => FieldKind::Integer,
            Self::Text(_) => FieldKind::String,
            Self::OptionalText(_) => FieldKind::OptionalString,
            Self::Timestamp(_) => FieldKind::Timestamp,
        }
    }

    /// Returns the textual content, if any.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) | Self::OptionalText(Some(text)) => Some(text),
            _ => None,
        }
    }

    /// Returns `true` for blank text and absent optional text.
    ///
    /// Integers and timestamps are never empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) | Self::OptionalText(Some(text)) => text.trim().is_empty(),
            Self::OptionalText(None) => true,
            Self::Integer(_) | Self::Timestamp(_) => false,
        }
    }

    /// Builds the value a textual placeholder takes for the given kind.
    ///
    /// Returns `None` for kinds that cannot hold text.
    #[must_use]
    pub fn from_placeholder(kind: FieldKind, placeholder: &str) -> Option<Self> {
        match kind {
            FieldKind::String => Some(Self::Text(placeholder.to_string())),
            FieldKind::OptionalString => Some(Self::OptionalText(Some(placeholder.to_string()))),
            FieldKind::Integer | FieldKind::Timestamp => None,
        }
    }
}

// =============================================================================
// Validation Rules
// =============================================================================

/// A structural rule checked against a field of a fully merged record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    /// Text must not be blank; optional text must be present and not blank.
    Required,
    /// Integer must lie within `min..=max`.
    Range {
        /// Inclusive lower bound.
        min: i64,
        /// Inclusive upper bound.
        max: i64,
    },
    /// Text must not exceed the given number of characters.
    MaxLength(usize),
    /// Text must be one of the listed values.
    OneOf(&'static [&'static str]),
}

impl FieldRule {
    /// Checks `value` against this rule, returning the violation if any.
    #[must_use]
    pub fn check(&self, field: &'static str, value: &FieldValue) -> Option<Violation> {
        let message = match (self, value) {
            (Self::Required, value) if value.is_empty() => format!("{field} is required"),
            (Self::Range { min, max }, FieldValue::Integer(number))
                if !(*min..=*max).contains(number) =>
            {
                format!("{field} must be between {min} and {max}")
            }
            (Self::MaxLength(max), value) => {
                let length = value.as_text().map_or(0, |text| text.chars().count());
                if length <= *max {
                    return None;
                }
                format!("{field} must not exceed {max} characters")
            }
            (Self::OneOf(allowed), value) => match value.as_text() {
                Some(text) if !allowed.iter().any(|candidate| *candidate == text) => {
                    format!("{field} must be one of: {}", allowed.join(", "))
                }
                _ => return None,
            },
            _ => return None,
        };

        Some(Violation::new(field, message))
    }
}

/// A single rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Name of the offending field.
    pub field: &'static str,
    /// Human-readable description of the violation.
    pub message: String,
}

impl Violation {
    /// Creates a new violation.
    #[must_use]
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Whole-record validation failure carrying every violated rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Violations in schema declaration order.
    pub violations: Vec<Violation>,
}

impl ValidationError {
    /// Creates a validation error from a list of violations.
    #[must_use]
    pub const fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    /// Returns `true` if any violation refers to `field`.
    #[must_use]
    pub fn mentions(&self, field: &str) -> bool {
        self.violations
            .iter()
            .any(|violation| violation.field == field)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("validation failed")?;
        for (index, violation) in self.violations.iter().enumerate() {
            let separator = if index == 0 { ": " } else { "; " };
            write!(formatter, "{separator}{}", violation.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

// =============================================================================
// Field Descriptor
// =============================================================================

/// Static metadata for one field of a record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Field name; doubles as the column name.
    pub name: &'static str,
    /// Declared storage kind.
    pub kind: FieldKind,
    /// Whether this field identifies the record.
    pub identity: bool,
    /// Whether clients may update this field.
    pub mutable: bool,
    /// Rules checked during whole-record validation.
    pub rules: &'static [FieldRule],
    /// Stand-in used to satisfy validation when a partial update omits the field.
    pub placeholder: Option<&'static str>,
}

impl FieldDescriptor {
    /// Creates a mutable, unconstrained field.
    #[must_use]
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            identity: false,
            mutable: true,
            rules: &[],
            placeholder: None,
        }
    }

    /// Marks the field as the record identity. Identity fields are immutable.
    #[must_use]
    pub const fn identity(mut self) -> Self {
        self.identity = true;
        self.mutable = false;
        self
    }

    /// Marks the field as server-managed.
    #[must_use]
    pub const fn immutable(mut self) -> Self {
        self.mutable = false;
        self
    }

    /// Sets the validation rules.
    #[must_use]
    pub const fn rules(mut self, rules: &'static [FieldRule]) -> Self {
        self.rules = rules;
        self
    }

    /// Sets the placeholder used when a partial update omits this field.
    #[must_use]
    pub const fn placeholder(mut self, placeholder: &'static str) -> Self {
        self.placeholder = Some(placeholder);
        self
    }
}

// =============================================================================
// Schema
// =============================================================================

/// Ordered field metadata for a record type.
///
/// Declaration order is significant: partial updates emit their column list
/// in this order, and positional statement parameters follow it.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    table: &'static str,
    fields: &'static [FieldDescriptor],
    identity: usize,
}

impl Schema {
    /// Creates a schema for `table`.
    ///
    /// # Panics
    ///
    /// Panics unless exactly one field is the identity and that field is
    /// immutable. In a `static` initializer this is a compile-time error.
    #[must_use]
    pub const fn new(table: &'static str, fields: &'static [FieldDescriptor]) -> Self {
        let mut identity = None;
        let mut index = 0;
        while index < fields.len() {
            let field = &fields[index];
            if field.identity {
                assert!(identity.is_none(), "schema declares more than one identity field");
                assert!(!field.mutable, "identity field must be immutable");
                identity = Some(index);
            }
            index += 1;
        }

        let Some(identity) = identity else {
            panic!("schema declares no identity field");
        };

        Self {
            table,
            fields,
            identity,
        }
    }

    /// Returns the table name.
    #[must_use]
    pub const fn table(&self) -> &'static str {
        self.table
    }

    /// Returns the fields in declaration order.
    #[must_use]
    pub const fn fields(&self) -> &'static [FieldDescriptor] {
        self.fields
    }

    /// Returns the identity field.
    #[must_use]
    pub const fn identity(&self) -> &'static FieldDescriptor {
        &self.fields[self.identity]
    }

    /// Looks up a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&'static FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Validates every field of `record` against its rules.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] listing all violations in declaration order.
    pub fn validate<R: Record>(&self, record: &R) -> Result<(), ValidationError> {
        let violations: Vec<Violation> = self
            .fields
            .iter()
            .filter_map(|field| record.value(field.name).map(|value| (field, value)))
            .flat_map(|(field, value)| {
                field
                    .rules
                    .iter()
                    .filter_map(move |rule| rule.check(field.name, &value))
            })
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(violations))
        }
    }
}

// =============================================================================
// Record
// =============================================================================

/// Error returned when a record refuses a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssignError {
    /// The record has no field with this name.
    #[error("unknown field '{0}'")]
    UnknownField(String),

    /// The field cannot hold a value of this kind.
    #[error("field '{field}' cannot hold {found} value")]
    Rejected {
        /// Field name.
        field: String,
        /// Kind of the rejected value.
        found: FieldKind,
    },
}

/// A record type described by a static [`Schema`].
pub trait Record {
    /// Returns the schema shared by all instances of this record type.
    fn schema() -> &'static Schema;

    /// Reads a field by name. Returns `None` for unknown fields.
    fn value(&self, field: &str) -> Option<FieldValue>;

    /// Writes a field by name.
    ///
    /// # Errors
    ///
    /// Returns [`AssignError`] if the field is unknown or `value` has the
    /// wrong kind for it.
    fn assign(&mut self, field: &str, value: FieldValue) -> Result<(), AssignError>;
}

// =============================================================================
// Tests
// =============================================================================
