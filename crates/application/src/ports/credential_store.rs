//! Credential storage port
//!
//! Persists one OAuth2 credential per user. No network access.

use async_trait::async_trait;
use domain::{entities::Credential, value_objects::UserId};
#[cfg(test)]
use mockall::automock;

use crate::error::StorageError;

/// Port for credential persistence
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Load the user's credential, if any
    async fn load(&self, user_id: &UserId) -> Result<Option<Credential>, StorageError>;

    /// Store or replace the user's credential
    async fn save(&self, user_id: &UserId, credential: &Credential) -> Result<(), StorageError>;

    /// Remove the user's credential; succeeds when none is stored
    async fn clear(&self, user_id: &UserId) -> Result<(), StorageError>;
}
