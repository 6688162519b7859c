//! Persistence module
//!
//! SQLite-based storage for OAuth credentials and the task read model.

pub mod connection;
pub mod credential_store;
pub mod error;
pub mod migrations;
pub mod task_store;

pub use connection::{ConnectionPool, IN_MEMORY, create_pool};
pub use credential_store::SqliteCredentialStore;
pub use error::DatabaseError;
pub use task_store::SqliteTaskStore;
