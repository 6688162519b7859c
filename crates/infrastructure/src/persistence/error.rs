//! Persistence errors and their mapping onto the application's `StorageError`

use application::StorageError;
use thiserror::Error;

/// Database errors
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Migration error: {0}")]
    Migration(String),

    /// A stored value could not be decoded
    #[error("Corrupt row: {0}")]
    Corrupt(String),

    /// The blocking worker panicked or was cancelled
    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl From<DatabaseError> for StorageError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::Pool(e) => Self::Unavailable(e.to_string()),
            DatabaseError::Join(e) => Self::Unavailable(e.to_string()),
            DatabaseError::Sqlite(rusqlite::Error::FromSqlConversionFailure(_, _, e)) => {
                Self::Corrupt(e.to_string())
            },
            DatabaseError::Sqlite(e) => Self::Query(e.to_string()),
            DatabaseError::Migration(msg) => Self::Query(msg),
            DatabaseError::Corrupt(msg) => Self::Corrupt(msg),
        }
    }
}

/// Wrap a decoding failure so it can be returned from a row mapper
pub(crate) fn conversion_error(
    column: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(err))
}
