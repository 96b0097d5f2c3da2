//! Row and attribute containers.

use std::fmt;
use std::sync::Arc;

use junction_foundation::{LtMap, Value};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A stored row: one value per schema column, in column order.
///
/// The row identifier is the key under which the row is stored and is not
/// repeated here.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Row(Arc<[Value]>);

impl Row {
    /// Creates a row from values in column order.
    #[must_use]
    pub fn new(values: Vec<Value>) -> Self {
        Self(values.into())
    }

    /// Returns the value at a column position.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    /// Returns a copy of this row with one position replaced.
    ///
    /// Out-of-range positions leave the row unchanged.
    #[must_use]
    pub fn with(&self, index: usize, value: Value) -> Self {
        let mut values = self.0.to_vec();
        if let Some(slot) = values.get_mut(index) {
            *slot = value;
        }
        Self::new(values)
    }

    /// Returns all values in column order.
    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.0
    }

    /// Returns the number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the row has no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Named values supplied by a caller when inserting a row.
///
/// Built fluently:
///
/// ```
/// use junction_storage::Attributes;
///
/// let attrs = Attributes::new().with("is_rented", true);
/// assert_eq!(attrs.get("is_rented").and_then(|v| v.as_bool()), Some(true));
/// ```
#[derive(Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Attributes(LtMap<String, Value>);

impl Attributes {
    /// Creates an empty attribute set.
    #[must_use]
    pub fn new() -> Self {
        Self(LtMap::new())
    }

    /// Returns a copy with the named value set.
    #[must_use]
    pub fn with(&self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self(self.0.insert(name.into(), value.into()))
    }

    /// Returns the value supplied for a name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Returns true if a value was supplied for the name.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Iterates over names and values in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the number of supplied values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if nothing was supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
