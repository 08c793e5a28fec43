//! Common test infrastructure
//!
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{RecordingStore, theme_rows};
//! use invite_schema::{SchemaVerifier, PUBLIC_SCHEMA};
//!
//! #[tokio::test]
//! async fn test_all_tables_reachable() {
//!     let store = RecordingStore::new().with_rows("themes", theme_rows());
//!     let report = SchemaVerifier::new(&store, &PUBLIC_SCHEMA).run().await.unwrap();
//!     assert!(report.is_success());
//! }
//! ```

mod constants;
mod server;
mod store;

// Public API - this is what tests import
#[allow(unused_imports)]
pub use constants::*;
#[allow(unused_imports)]
pub use server::{FakePostgrest, RecordedRequest};
#[allow(unused_imports)]
pub use store::{RecordedCall, RecordingStore};
