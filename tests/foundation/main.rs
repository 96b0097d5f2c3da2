//! Integration tests for Layer 0: Foundation
//!
//! Tests for values, types, row identifiers, collections, and errors.

mod collections;
mod values;
