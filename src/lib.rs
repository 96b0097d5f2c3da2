//! Junction - Relational association store
//!
//! This crate re-exports all layers of the Junction system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 2: junction_runtime    - Sessions, transactions, persistence, scenarios, CLI
//! Layer 1: junction_storage    - Schemas, tables, association index, Store
//! Layer 0: junction_foundation - Core types (Value, RowId, Error)
//! ```

pub use junction_foundation as foundation;
pub use junction_runtime as runtime;
pub use junction_storage as storage;
