//! Tables, association schemas, and the immutable store for Junction.
//!
//! This crate provides:
//! - [`AssociationSchema`] - How clients and cars are linked and what each link carries
//! - [`Table`] - Schema-checked row storage with monotonic identifiers
//! - [`AssociationIndex`] - Bidirectional navigation between clients and cars
//! - [`Client`], [`Car`], [`ClientCar`] - Typed records mapped to rows
//! - [`Store`] - Immutable snapshot with structural sharing

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod catalog;
pub mod index;
pub mod record;
pub mod row;
pub mod schema;
pub mod store;
pub mod table;

pub use index::AssociationIndex;
pub use record::{AssociationId, Car, CarId, Client, ClientCar, ClientId, Record};
pub use row::{Attributes, Row};
pub use schema::{
    AssociationSchema, ColumnSchema, DefaultValue, ForeignKey, IS_RENTED, LinkStorage, OnDelete,
    RENTED_TIME, TableSchema,
};
pub use store::Store;
pub use table::Table;
