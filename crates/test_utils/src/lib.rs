//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! payroll tracking test suite.
//!
//! # Modules
//!
//! - `fixtures`: Ready-made actors, amounts, and submission payloads
//! - `builders`: Builders that walk claims and disputes to a target status
//! - `database`: PostgreSQL test container management
//! - `assertions`: Assertion helpers for review cases and errors
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
