//! Invitation platform data model and schema-accessibility verifier.
//!
//! This library exposes the internal modules for the `verify-db` binary and
//! for tests.

pub mod cli_style;
pub mod config;
pub mod schema;
pub mod store;
pub mod verifier;

// Re-export commonly used types for convenience
pub use schema::{DatabaseSchema, TableDef, PUBLIC_SCHEMA};
pub use store::{DataStore, PostgrestStore, Query, Record, SqliteStore, StoreError};
pub use verifier::{SchemaVerifier, VerificationReport, VerifyError};
