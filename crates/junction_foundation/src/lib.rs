//! Core values, types, row identifiers, and errors for Junction.
//!
//! This crate provides:
//! - [`Value`] - A single cell value stored in a table row
//! - [`Type`] - Column type descriptors for schema validation
//! - [`RowId`] - Monotonic row identifiers
//! - [`Error`] - Rich error types with context
//! - [`LtMap`] - Persistent ordered map with structural sharing

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod collections;
pub mod error;
pub mod id;
pub mod types;
pub mod value;

pub use collections::LtMap;
pub use error::{Error, ErrorContext, ErrorKind};
pub use id::RowId;
pub use types::Type;
pub use value::Value;

/// Result type alias using Junction's Error type.
pub type Result<T> = std::result::Result<T, Error>;
