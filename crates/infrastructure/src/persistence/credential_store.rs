//! SQLite credential store implementation
//!
//! Implements the `CredentialStore` port using SQLite. One row per user;
//! clearing deletes the row.

use std::sync::Arc;

use application::{StorageError, ports::CredentialStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{Credential, UserId};
use rusqlite::{OptionalExtension, Row, params};
use tokio::task;
use tracing::{debug, instrument};

use super::{
    connection::ConnectionPool,
    error::{DatabaseError, conversion_error},
};

/// SQLite-based OAuth credential store
#[derive(Debug, Clone)]
pub struct SqliteCredentialStore {
    pool: Arc<ConnectionPool>,
}

impl SqliteCredentialStore {
    /// Create a new SQLite credential store
    #[must_use]
    pub const fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }
}

/// Convert a database row to a `Credential`
fn row_to_credential(row: &Row<'_>) -> Result<Credential, rusqlite::Error> {
    let access_token: String = row.get(0)?;
    let refresh_token: Option<String> = row.get(1)?;
    let expires_at: Option<String> = row.get(2)?;
    let scope: Option<String> = row.get(3)?;
    let token_type: Option<String> = row.get(4)?;

    let expires_at = expires_at
        .map(|s| DateTime::parse_from_rfc3339(&s).map(|dt| dt.with_timezone(&Utc)))
        .transpose()
        .map_err(|e| conversion_error(2, e))?;

    Ok(Credential {
        access_token,
        refresh_token,
        expires_at,
        scope,
        token_type,
    })
}

#[async_trait]
impl CredentialStore for SqliteCredentialStore {
    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn load(&self, user_id: &UserId) -> Result<Option<Credential>, StorageError> {
        let pool = Arc::clone(&self.pool);
        let user_id_str = user_id.to_string();

        let result = task::spawn_blocking(move || -> Result<_, DatabaseError> {
            let conn = pool.get()?;

            let credential = conn
                .query_row(
                    "SELECT access_token, refresh_token, expires_at, scope, token_type
                     FROM calendar_credentials WHERE user_id = ?1",
                    [&user_id_str],
                    row_to_credential,
                )
                .optional()?;

            debug!(found = credential.is_some(), "Loaded calendar credential");
            Ok(credential)
        })
        .await
        .map_err(DatabaseError::from)?;

        Ok(result?)
    }

    #[instrument(skip(self, credential), fields(user_id = %user_id))]
    async fn save(&self, user_id: &UserId, credential: &Credential) -> Result<(), StorageError> {
        let pool = Arc::clone(&self.pool);
        let user_id_str = user_id.to_string();
        let credential = credential.clone();
        let now = Utc::now().to_rfc3339();

        let result = task::spawn_blocking(move || -> Result<_, DatabaseError> {
            let conn = pool.get()?;

            conn.execute(
                "INSERT INTO calendar_credentials
                     (user_id, access_token, refresh_token, expires_at, scope, token_type, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(user_id) DO UPDATE SET
                     access_token = excluded.access_token,
                     refresh_token = excluded.refresh_token,
                     expires_at = excluded.expires_at,
                     scope = excluded.scope,
                     token_type = excluded.token_type,
                     updated_at = excluded.updated_at",
                params![
                    user_id_str,
                    credential.access_token,
                    credential.refresh_token,
                    credential.expires_at.map(|dt| dt.to_rfc3339()),
                    credential.scope,
                    credential.token_type,
                    now,
                ],
            )?;

            debug!("Saved calendar credential");
            Ok(())
        })
        .await
        .map_err(DatabaseError::from)?;

        Ok(result?)
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn clear(&self, user_id: &UserId) -> Result<(), StorageError> {
        let pool = Arc::clone(&self.pool);
        let user_id_str = user_id.to_string();

        let result = task::spawn_blocking(move || -> Result<_, DatabaseError> {
            let conn = pool.get()?;

            let deleted = conn.execute(
                "DELETE FROM calendar_credentials WHERE user_id = ?1",
                [&user_id_str],
            )?;

            debug!(deleted = deleted > 0, "Cleared calendar credential");
            Ok(())
        })
        .await
        .map_err(DatabaseError::from)?;

        Ok(result?)
    }
}
