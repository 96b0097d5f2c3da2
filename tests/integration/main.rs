//! Cross-layer integration tests for Junction
//!
//! Tests that verify sessions, transactions, and persistence working with the store.

mod persistence;
