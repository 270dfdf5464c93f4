//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! rural producers test suite.
//!
//! # Modules
//!
//! - `fixtures`: Known-good identifiers and a seeded in-memory producer port
//! - `builders`: Builders for producer JSON payloads
//! - `database`: PostgreSQL container management for adapter tests
//! - `assertions`: Helpers for checking error payloads
//! - `generators`: Property-based generators for CPF, CNPJ and farm areas

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
