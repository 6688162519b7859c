//! Infrastructure layer - Adapters for external systems
//!
//! Implements ports defined in the application layer: SQLite stores for
//! credentials and tasks, Google OAuth and Calendar adapters, and the
//! configuration loaded at startup.

pub mod adapters;
pub mod config;
pub mod persistence;

pub use adapters::*;
pub use config::{
    ApiKeyEntry, AppConfig, DatabaseConfig, Environment, GoogleCalendarAppConfig, LogFormat,
    SecurityConfig, ServerConfig,
};
pub use persistence::{
    ConnectionPool, DatabaseError, SqliteCredentialStore, SqliteTaskStore, create_pool,
};
