//! Sessions, persistence, and demo scenarios for Junction.
//!
//! This crate provides:
//! - [`Session`] and [`Transaction`] - Units of work over an immutable store
//! - [`SessionConfig`] - Where and how a session persists
//! - Store snapshot serialization (`MessagePack`)
//! - [`Scenario`] - The runnable association demonstrations behind the `junction` CLI

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod scenario;
pub mod serialize;
pub mod session;

pub use config::SessionConfig;
pub use scenario::{Scenario, ScenarioError};
pub use session::{Session, Transaction};
