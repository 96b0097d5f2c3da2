//! Configuration for opening a session.

use std::path::{Path, PathBuf};

use junction_storage::AssociationSchema;

/// Configuration for a [`Session`](crate::Session).
///
/// Controls where the store is persisted and which association schema it
/// uses.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionConfig {
    /// Store file; `None` keeps the store in memory only.
    pub path: Option<PathBuf>,

    /// Discard any existing store file on open.
    pub reset: bool,

    /// Association schema for a new store, and the schema an existing store
    /// file must match.
    pub schema: AssociationSchema,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            path: None,
            reset: false,
            schema: AssociationSchema::join_table(),
        }
    }
}

impl SessionConfig {
    /// Creates an in-memory configuration with a plain join table.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Creates a configuration persisting to `path`.
    #[must_use]
    pub fn at(path: impl AsRef<Path>) -> Self {
        Self {
            path: Some(path.as_ref().to_path_buf()),
            ..Self::default()
        }
    }

    /// Builder method to discard an existing store file on open.
    #[must_use]
    pub fn with_reset(mut self, reset: bool) -> Self {
        self.reset = reset;
        self
    }

    /// Builder method to set the association schema.
    #[must_use]
    pub fn with_schema(mut self, schema: AssociationSchema) -> Self {
        self.schema = schema;
        self
    }

    /// Returns true if commits are written to disk.
    #[must_use]
    pub fn persists(&self) -> bool {
        self.path.is_some()
    }
}
