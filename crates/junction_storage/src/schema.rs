//! Schema definitions for tables and associations.
//!
//! Schemas are explicit descriptors: every table lists its columns, their
//! types, and the default policy the store applies at insertion time.

use std::fmt;

use chrono::{DateTime, Utc};
use junction_foundation::{Error, Result, Type, Value};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Name of the creation timestamp attribute on rental associations.
pub const RENTED_TIME: &str = "rented_time";

/// Name of the "currently rented" flag on rental associations.
pub const IS_RENTED: &str = "is_rented";

/// Default value policy for a column.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DefaultValue {
    /// A constant value.
    Value(Value),
    /// The current UTC time at insertion.
    CurrentTimestamp,
}

impl DefaultValue {
    /// Evaluates the default for a row inserted at `now`.
    #[must_use]
    pub fn evaluate(&self, now: DateTime<Utc>) -> Value {
        match self {
            Self::Value(value) => value.clone(),
            Self::CurrentTimestamp => Value::Timestamp(now),
        }
    }
}

/// Schema definition for a table column.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ColumnSchema {
    /// Column name.
    pub name: String,
    /// Column type.
    pub ty: Type,
    /// Default applied when no value is supplied.
    pub default: Option<DefaultValue>,
    /// Whether a value (supplied or defaulted) must be present.
    pub required: bool,
    /// Whether text values must be non-empty.
    pub non_empty: bool,
}

impl ColumnSchema {
    /// Creates a required column with no default.
    #[must_use]
    pub fn required(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
            required: true,
            non_empty: false,
        }
    }

    /// Creates an optional column with a constant default.
    #[must_use]
    pub fn optional(name: impl Into<String>, ty: Type, default: Value) -> Self {
        Self {
            name: name.into(),
            ty,
            default: Some(DefaultValue::Value(default)),
            required: false,
            non_empty: false,
        }
    }

    /// Creates an optional column with no default (will be nil).
    #[must_use]
    pub fn optional_nil(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
            required: false,
            non_empty: false,
        }
    }

    /// Creates a column filled by a default policy when not supplied.
    #[must_use]
    pub fn defaulted(name: impl Into<String>, ty: Type, default: DefaultValue) -> Self {
        Self {
            name: name.into(),
            ty,
            default: Some(default),
            required: false,
            non_empty: false,
        }
    }

    /// Requires text values to be non-empty.
    #[must_use]
    pub fn non_empty(mut self) -> Self {
        self.non_empty = true;
        self
    }

    /// Returns true if a caller must supply this column.
    #[must_use]
    pub fn must_be_supplied(&self) -> bool {
        self.required && self.default.is_none()
    }

    /// Checks a value against the column's type and constraints.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` or `Validation` errors.
    pub fn check(&self, table: &str, value: &Value) -> Result<()> {
        if value.is_nil() {
            if self.required {
                return Err(Error::missing_attribute(table, &self.name));
            }
            return Ok(());
        }

        let actual = value.value_type();
        if !self.ty.accepts(&actual) {
            return Err(Error::type_mismatch(&self.name, self.ty.clone(), actual));
        }

        if self.non_empty && value.as_str().is_some_and(str::is_empty) {
            return Err(Error::validation(table, &self.name, "must not be empty"));
        }

        Ok(())
    }
}

/// A foreign key from one column to another table's identifier.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ForeignKey {
    /// The referencing column.
    pub column: String,
    /// The referenced table.
    pub references: String,
}

/// Schema definition for a table.
///
/// Every table has an implicit integer `id` primary key that is not listed
/// among the columns.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TableSchema {
    /// Table name.
    pub name: String,
    /// Column definitions, in storage order.
    pub columns: Vec<ColumnSchema>,
    /// Foreign keys declared on the table.
    pub foreign_keys: Vec<ForeignKey>,
}

impl TableSchema {
    /// Creates a new table schema with no columns.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    /// Adds a column to the schema.
    #[must_use]
    pub fn with_column(mut self, column: ColumnSchema) -> Self {
        self.columns.push(column);
        self
    }

    /// Adds a foreign key to the schema.
    #[must_use]
    pub fn with_foreign_key(mut self, column: impl Into<String>, references: impl Into<String>) -> Self {
        self.foreign_keys.push(ForeignKey {
            column: column.into(),
            references: references.into(),
        });
        self
    }

    /// Returns the column schema by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Returns the storage position of a column.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Returns the foreign key declared on a column, if any.
    #[must_use]
    pub fn foreign_key(&self, column: &str) -> Option<&ForeignKey> {
        self.foreign_keys.iter().find(|fk| fk.column == column)
    }
}

impl fmt::Display for TableSchema {
    /// Renders `client_car(id, client_id -> client.id, car_id -> car.id, is_rented)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(id", self.name)?;
        for column in &self.columns {
            write!(f, ", {}", column.name)?;
            if let Some(fk) = self.foreign_key(&column.name) {
                write!(f, " -> {}.id", fk.references)?;
            }
        }
        write!(f, ")")
    }
}

/// How the client/car relationship is stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LinkStorage {
    /// A single `client_id` column on the car row.
    ///
    /// Each car can point at one client only, so associating a second
    /// client replaces the first without error.
    ForeignKey,
    /// An independent `client_car` table with one row per association.
    JoinTable,
}

/// What happens to associations when a client or car is deleted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OnDelete {
    /// Delete the association rows (join table only).
    Remove,
    /// Delete the cars a deleted client holds (foreign key only).
    Cascade,
    /// Clear the foreign key on the cars a deleted client holds (foreign key only).
    Nullify,
    /// Reject the delete while associations exist.
    Restrict,
}

/// Schema definition for the client/car association.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AssociationSchema {
    /// How the association is stored.
    pub storage: LinkStorage,
    /// What happens when an endpoint is deleted.
    pub on_delete: OnDelete,
    /// Extra attributes on each association row (join table only).
    pub attributes: Vec<ColumnSchema>,
}

impl AssociationSchema {
    /// Creates a schema with the default delete policy for its storage.
    #[must_use]
    pub fn new(storage: LinkStorage) -> Self {
        let on_delete = match storage {
            LinkStorage::ForeignKey => OnDelete::Cascade,
            LinkStorage::JoinTable => OnDelete::Remove,
        };
        Self {
            storage,
            on_delete,
            attributes: Vec::new(),
        }
    }

    /// A foreign key on the car table (one client per car).
    #[must_use]
    pub fn foreign_key() -> Self {
        Self::new(LinkStorage::ForeignKey)
    }

    /// A plain join table with no extra attributes.
    #[must_use]
    pub fn join_table() -> Self {
        Self::new(LinkStorage::JoinTable)
    }

    /// A join table that records when each association was created.
    #[must_use]
    pub fn timestamped() -> Self {
        Self::join_table().with_attribute(ColumnSchema::defaulted(
            RENTED_TIME,
            Type::Timestamp,
            DefaultValue::CurrentTimestamp,
        ))
    }

    /// A timestamped join table whose rows also carry a caller-supplied
    /// "currently rented" flag.
    #[must_use]
    pub fn rental() -> Self {
        Self::timestamped().with_attribute(ColumnSchema::required(IS_RENTED, Type::Bool))
    }

    /// Sets the on-delete behavior.
    #[must_use]
    pub fn with_on_delete(mut self, on_delete: OnDelete) -> Self {
        self.on_delete = on_delete;
        self
    }

    /// Adds an attribute to the association.
    #[must_use]
    pub fn with_attribute(mut self, attr: ColumnSchema) -> Self {
        self.attributes.push(attr);
        self
    }

    /// Returns the attribute schema by name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&ColumnSchema> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Checks that the storage, delete policy, and attributes fit together.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSchema` describing the first inconsistency found.
    pub fn validate(&self) -> Result<()> {
        match (self.storage, self.on_delete) {
            (LinkStorage::JoinTable, OnDelete::Cascade | OnDelete::Nullify) => {
                return Err(Error::invalid_schema(format!(
                    "{:?} applies to foreign-key storage only",
                    self.on_delete
                )));
            }
            (LinkStorage::ForeignKey, OnDelete::Remove) => {
                return Err(Error::invalid_schema(
                    "foreign-key storage has no association rows to remove; use Nullify",
                ));
            }
            _ => {}
        }

        if self.storage == LinkStorage::ForeignKey && !self.attributes.is_empty() {
            return Err(Error::invalid_schema(
                "attributes on the association require join-table storage",
            ));
        }

        let mut seen: Vec<&str> = Vec::with_capacity(self.attributes.len());
        for attr in &self.attributes {
            if attr.name == "id" || attr.name == crate::catalog::CLIENT_ID || attr.name == crate::catalog::CAR_ID {
                return Err(Error::invalid_schema(format!(
                    "attribute name is reserved: {}",
                    attr.name
                )));
            }
            if seen.contains(&attr.name.as_str()) {
                return Err(Error::invalid_schema(format!(
                    "duplicate attribute: {}",
                    attr.name
                )));
            }
            seen.push(&attr.name);
        }

        Ok(())
    }
}
