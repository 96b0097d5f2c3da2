//! Type descriptors for schema validation.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Type descriptor for a table column.
///
/// Used to declare column types and validate values at insertion time.
#[derive(Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Type {
    /// The nil type (only value: nil).
    Nil,
    /// Boolean type.
    Bool,
    /// UTF-8 text.
    Text,
    /// UTC timestamp.
    Timestamp,
    /// Reference to a row in another table.
    Ref,
    /// Optional type (value or nil).
    Option(Box<Type>),
}

impl Type {
    /// Creates an optional type.
    #[must_use]
    pub fn option(inner: Type) -> Self {
        Self::Option(Box::new(inner))
    }

    /// Checks if a value type is accepted by this type.
    ///
    /// - `Option(T)` accepts `Nil` and any type that `T` accepts
    /// - Everything else must match exactly
    #[must_use]
    pub fn accepts(&self, value_type: &Type) -> bool {
        match (self, value_type) {
            (Self::Option(inner), actual) => matches!(actual, Self::Nil) || inner.accepts(actual),
            (expected, actual) => expected == actual,
        }
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => write!(f, "nil"),
            Self::Bool => write!(f, "bool"),
            Self::Text => write!(f, "text"),
            Self::Timestamp => write!(f, "timestamp"),
            Self::Ref => write!(f, "ref"),
            Self::Option(t) => write!(f, "option<{t:?}>"),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
