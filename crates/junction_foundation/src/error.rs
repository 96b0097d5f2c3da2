//! Error types for the Junction system.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.

use std::fmt;

use thiserror::Error;

use crate::id::RowId;
use crate::types::Type;

/// The main error type for Junction operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Creates a referential integrity error.
    #[must_use]
    pub fn referential_integrity(
        table: impl Into<String>,
        column: impl Into<String>,
        id: RowId,
    ) -> Self {
        Self::new(ErrorKind::ReferentialIntegrity {
            table: table.into(),
            column: column.into(),
            id,
        })
    }

    /// Creates a missing required attribute error.
    #[must_use]
    pub fn missing_attribute(table: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::new(ErrorKind::MissingRequiredAttribute {
            table: table.into(),
            attribute: attribute.into(),
        })
    }

    /// Creates a validation error.
    #[must_use]
    pub fn validation(
        table: impl Into<String>,
        column: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(ErrorKind::Validation {
            table: table.into(),
            column: column.into(),
            message: message.into(),
        })
    }

    /// Creates an unknown attribute error.
    #[must_use]
    pub fn unknown_attribute(table: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownAttribute {
            table: table.into(),
            attribute: attribute.into(),
        })
    }

    /// Creates a type mismatch error.
    #[must_use]
    pub fn type_mismatch(column: impl Into<String>, expected: Type, actual: Type) -> Self {
        Self::new(ErrorKind::TypeMismatch {
            column: column.into(),
            expected,
            actual,
        })
    }

    /// Creates a row not found error.
    #[must_use]
    pub fn row_not_found(table: impl Into<String>, id: RowId) -> Self {
        Self::new(ErrorKind::RowNotFound {
            table: table.into(),
            id,
        })
    }

    /// Creates a restricted delete error.
    #[must_use]
    pub fn restricted(table: impl Into<String>, id: RowId, dependents: usize) -> Self {
        Self::new(ErrorKind::Restricted {
            table: table.into(),
            id,
            dependents,
        })
    }

    /// Creates an invalid schema error.
    #[must_use]
    pub fn invalid_schema(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidSchema(message.into()))
    }

    /// Returns true if this is a referential integrity violation.
    #[must_use]
    pub fn is_referential_integrity(&self) -> bool {
        matches!(self.kind, ErrorKind::ReferentialIntegrity { .. })
    }

    /// Returns true if a required attribute was not supplied.
    #[must_use]
    pub fn is_missing_attribute(&self) -> bool {
        matches!(self.kind, ErrorKind::MissingRequiredAttribute { .. })
    }

    /// Returns true if a value failed column validation.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self.kind, ErrorKind::Validation { .. })
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// A foreign key value does not refer to an existing row.
    #[error("referential integrity violation: {table}.{column} references missing row {id}")]
    ReferentialIntegrity {
        /// The table holding the foreign key.
        table: String,
        /// The foreign key column.
        column: String,
        /// The identifier that does not exist.
        id: RowId,
    },

    /// A required attribute with no default was not supplied.
    #[error("missing required attribute: {table}.{attribute} has no default and no value")]
    MissingRequiredAttribute {
        /// The table the row belongs to.
        table: String,
        /// The attribute that was missing.
        attribute: String,
    },

    /// A value violated a column constraint.
    #[error("validation failed for {table}.{column}: {message}")]
    Validation {
        /// The table the row belongs to.
        table: String,
        /// The offending column.
        column: String,
        /// What went wrong.
        message: String,
    },

    /// An attribute is not declared by the table schema.
    #[error("unknown attribute: {attribute} is not a column of {table}")]
    UnknownAttribute {
        /// The table that was written to.
        table: String,
        /// The undeclared attribute name.
        attribute: String,
    },

    /// A value has the wrong type for its column.
    #[error("type mismatch for {column}: expected {expected}, got {actual}")]
    TypeMismatch {
        /// The column being written.
        column: String,
        /// The declared column type.
        expected: Type,
        /// The type of the supplied value.
        actual: Type,
    },

    /// A row was not found.
    #[error("row not found: {table} #{id}")]
    RowNotFound {
        /// The table that was queried.
        table: String,
        /// The missing identifier.
        id: RowId,
    },

    /// A delete was rejected because dependent rows exist.
    #[error("cannot delete {table} #{id}: {dependents} association(s) still reference it")]
    Restricted {
        /// The table of the row being deleted.
        table: String,
        /// The row being deleted.
        id: RowId,
        /// Number of dependent association rows.
        dependents: usize,
    },

    /// An association schema is internally inconsistent.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    /// A unit of work was aborted by an earlier failed write.
    #[error("transaction aborted: {0}")]
    TransactionAborted(String),

    /// I/O error while reading or writing a store file.
    #[error("I/O error: {0}")]
    Io(String),

    /// Encoding or decoding a store snapshot failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Store operation that failed (e.g. `associate`).
    pub operation: Option<String>,
    /// File the operation was working on.
    pub path: Option<String>,
    /// Free-form notes, outermost last.
    pub notes: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the operation name.
    #[must_use]
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    /// Sets the file path.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Adds a note.
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(operation) = &self.operation {
            write!(f, "in {operation}")?;
        }
        if let Some(path) = &self.path {
            write!(f, " ({path})")?;
        }
        for note in &self.notes {
            write!(f, "\n  note: {note}")?;
        }
        Ok(())
    }
}
