//! Integration tests for Layer 1: Storage
//!
//! Tests for schemas, tables, navigation, and delete policies of the store.

mod associations;
mod deletes;
mod schema;
