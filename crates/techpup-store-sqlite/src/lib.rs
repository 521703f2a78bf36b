//! SQLite backend for the TechPup profile workflow.
//!
//! Implements both backend traits — accounts with argon2 password hashes for
//! [`IdentityService`](techpup_core::store::IdentityService), path-keyed JSON
//! rows for [`DocumentStore`](techpup_core::store::DocumentStore). Wraps
//! [`tokio_rusqlite`] so all database access runs off the async runtime.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteBackend;
