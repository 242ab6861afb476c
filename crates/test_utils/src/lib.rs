//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! SplitLedger test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built users, groups and amounts
//! - `builders`: In-memory service scenarios and group builders
//! - `database`: PostgreSQL testcontainer management
//! - `assertions`: Assertion helpers for bills, splits and money
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod database;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use database::*;
pub use assertions::*;
pub use generators::*;
