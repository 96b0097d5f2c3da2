//! Row storage for a single table.
//!
//! A `Table` owns its schema, its identifier counter, and a persistent map
//! from row identifier to row. Cloning a table is O(1).

use chrono::{DateTime, Utc};
use junction_foundation::{Error, LtMap, Result, RowId, Value};

use crate::row::{Attributes, Row};
use crate::schema::TableSchema;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Rows of one table keyed by identifier.
///
/// Identifiers are allocated monotonically and never reused, so key order is
/// insertion order.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Table {
    schema: TableSchema,
    next_id: RowId,
    rows: LtMap<RowId, Row>,
}

impl Table {
    /// Creates an empty table.
    #[must_use]
    pub fn new(schema: TableSchema) -> Self {
        Self {
            schema,
            next_id: RowId::FIRST,
            rows: LtMap::new(),
        }
    }

    /// Returns the table schema.
    #[must_use]
    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// Returns the table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.schema.name
    }

    /// Builds a row from named values without storing it.
    ///
    /// Columns that are not supplied, or supplied as nil, take their default
    /// (evaluated at `now`) or nil.
    ///
    /// # Errors
    ///
    /// Returns `UnknownAttribute` for a name the schema does not declare, and
    /// `MissingRequiredAttribute`, `TypeMismatch`, or `Validation` when a
    /// column rejects its value.
    pub fn build_row(&self, attrs: &Attributes, now: DateTime<Utc>) -> Result<Row> {
        if let Some((name, _)) = attrs.iter().find(|(name, _)| self.schema.column(name).is_none()) {
            return Err(Error::unknown_attribute(self.name(), name));
        }

        let mut values = Vec::with_capacity(self.schema.columns.len());
        for column in &self.schema.columns {
            let value = match attrs.get(&column.name).filter(|v| !v.is_nil()) {
                Some(value) => value.clone(),
                None if column.must_be_supplied() => {
                    return Err(Error::missing_attribute(self.name(), &column.name));
                }
                None => column
                    .default
                    .as_ref()
                    .map_or(Value::Nil, |default| default.evaluate(now)),
            };
            column.check(self.name(), &value)?;
            values.push(value);
        }

        Ok(Row::new(values))
    }

    /// Validates and stores a new row, returning its identifier.
    ///
    /// # Errors
    ///
    /// See [`Table::build_row`]. Nothing is stored on error.
    pub fn insert(&mut self, attrs: &Attributes, now: DateTime<Utc>) -> Result<RowId> {
        let row = self.build_row(attrs, now)?;
        let id = self.next_id;
        self.rows = self.rows.insert(id, row);
        self.next_id = id.next();
        Ok(id)
    }

    /// Gets a row by identifier.
    #[must_use]
    pub fn get(&self, id: RowId) -> Option<&Row> {
        self.rows.get(&id)
    }

    /// Gets a single column value of a row.
    #[must_use]
    pub fn value(&self, id: RowId, column: &str) -> Option<&Value> {
        let index = self.schema.column_index(column)?;
        self.get(id)?.get(index)
    }

    /// Returns true if a row with this identifier exists.
    #[must_use]
    pub fn exists(&self, id: RowId) -> bool {
        self.rows.contains_key(&id)
    }

    /// Checks that a row exists.
    ///
    /// # Errors
    ///
    /// Returns `RowNotFound` if it does not.
    pub fn validate(&self, id: RowId) -> Result<()> {
        if self.exists(id) {
            Ok(())
        } else {
            Err(Error::row_not_found(self.name(), id))
        }
    }

    /// Replaces one column value of an existing row.
    ///
    /// # Errors
    ///
    /// Returns `RowNotFound`, `UnknownAttribute`, or the column's own check
    /// failure.
    pub fn update(&mut self, id: RowId, column: &str, value: Value) -> Result<()> {
        let index = self
            .schema
            .column_index(column)
            .ok_or_else(|| Error::unknown_attribute(self.name(), column))?;
        self.schema.columns[index].check(self.name(), &value)?;

        let row = self
            .rows
            .get(&id)
            .ok_or_else(|| Error::row_not_found(self.name(), id))?;
        self.rows = self.rows.insert(id, row.with(index, value));
        Ok(())
    }

    /// Removes a row, returning it.
    ///
    /// # Errors
    ///
    /// Returns `RowNotFound` if the row does not exist.
    pub fn remove(&mut self, id: RowId) -> Result<Row> {
        let row = self
            .rows
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::row_not_found(self.name(), id))?;
        self.rows = self.rows.remove(&id);
        Ok(row)
    }

    /// Iterates over rows in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (RowId, &Row)> {
        self.rows.iter().map(|(id, row)| (*id, row))
    }

    /// Returns the number of stored rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
