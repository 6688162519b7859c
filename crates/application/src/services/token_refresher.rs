//! Access token renewal
//!
//! Renews expired access tokens from the stored refresh token. Concurrent
//! callers may both refresh; the last `save` wins, which is harmless because
//! every renewed token is valid.

use std::{fmt, sync::Arc};

use chrono::{DateTime, Utc};
use domain::{entities::Credential, value_objects::UserId};
use tracing::{debug, info, instrument, warn};

use crate::{
    error::ConnectionError,
    ports::{CredentialStore, OAuthProviderPort},
};

/// Keeps a user's credential usable
pub struct TokenRefresher {
    store: Arc<dyn CredentialStore>,
    provider: Arc<dyn OAuthProviderPort>,
}

impl fmt::Debug for TokenRefresher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenRefresher").finish_non_exhaustive()
    }
}

impl TokenRefresher {
    pub fn new(store: Arc<dyn CredentialStore>, provider: Arc<dyn OAuthProviderPort>) -> Self {
        Self { store, provider }
    }

    /// Return `credential` if still valid, otherwise refresh and persist it
    pub async fn ensure_valid(
        &self,
        user_id: &UserId,
        credential: Credential,
    ) -> Result<Credential, ConnectionError> {
        self.ensure_valid_at(user_id, credential, Utc::now()).await
    }

    /// [`Self::ensure_valid`] against an explicit clock
    #[instrument(skip(self, credential, now), fields(user_id = %user_id))]
    pub async fn ensure_valid_at(
        &self,
        user_id: &UserId,
        credential: Credential,
        now: DateTime<Utc>,
    ) -> Result<Credential, ConnectionError> {
        if !credential.is_expired_at(now) {
            return Ok(credential);
        }

        let Some(refresh_token) = credential
            .refresh_token
            .clone()
            .filter(|t| !t.trim().is_empty())
        else {
            debug!("Access token expired and no refresh token is stored");
            return Err(ConnectionError::NotConnected);
        };

        let grant = self.provider.refresh(&refresh_token).await.map_err(|e| {
            warn!(error = %e, "Token refresh failed");
            ConnectionError::RefreshFailed(e.to_string())
        })?;

        let renewed = grant
            .into_credential(now)
            .carry_forward_refresh_token(Some(&credential));
        if !renewed.has_access_token() {
            warn!("Provider returned an empty access token");
            return Err(ConnectionError::RefreshFailed(
                "provider returned an empty access token".to_string(),
            ));
        }

        self.store.save(user_id, &renewed).await?;
        info!(expires_at = ?renewed.expires_at, "Access token refreshed");
        Ok(renewed)
    }

    /// Load the stored credential and make sure it is usable
    pub async fn valid_credential(&self, user_id: &UserId) -> Result<Credential, ConnectionError> {
        let credential = self
            .store
            .load(user_id)
            .await?
            .filter(|c| !c.is_disconnected())
            .ok_or(ConnectionError::NotConnected)?;
        self.ensure_valid(user_id, credential).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::{
        error::{ProviderError, StorageError},
        ports::{MockCredentialStore, MockOAuthProviderPort, TokenGrant},
    };

    fn grant(access: &str, refresh: Option<&str>) -> TokenGrant {
        TokenGrant {
            access_token: access.to_string(),
            refresh_token: refresh.map(str::to_string),
            expires_in: Some(3600),
            scope: None,
            token_type: Some("Bearer".to_string()),
        }
    }

    fn expired(now: DateTime<Utc>) -> Credential {
        Credential::new("old-access")
            .with_refresh_token("refresh-1")
            .with_expires_at(now - Duration::minutes(5))
    }

    #[tokio::test]
    async fn valid_token_is_returned_unchanged() {
        let store = MockCredentialStore::new();
        let provider = MockOAuthProviderPort::new();
        let refresher = TokenRefresher::new(Arc::new(store), Arc::new(provider));

        let now = Utc::now();
        let cred = Credential::new("a").with_expires_at(now + Duration::hours(1));
        let result = refresher
            .ensure_valid_at(&UserId::new(), cred.clone(), now)
            .await
            .unwrap();
        assert_eq!(result, cred);
    }

    #[tokio::test]
    async fn expired_token_is_refreshed_and_refresh_token_kept() {
        let mut store = MockCredentialStore::new();
        store
            .expect_save()
            .times(1)
            .withf(|_, c| {
                c.access_token == "new-access" && c.refresh_token.as_deref() == Some("refresh-1")
            })
            .returning(|_, _| Ok(()));
        let mut provider = MockOAuthProviderPort::new();
        provider
            .expect_refresh()
            .withf(|rt| rt == "refresh-1")
            .times(1)
            .returning(|_| Ok(grant("new-access", None)));

        let refresher = TokenRefresher::new(Arc::new(store), Arc::new(provider));
        let now = Utc::now();
        let renewed = refresher
            .ensure_valid_at(&UserId::new(), expired(now), now)
            .await
            .unwrap();

        assert_eq!(renewed.access_token, "new-access");
        assert_eq!(renewed.refresh_token.as_deref(), Some("refresh-1"));
        assert_eq!(renewed.expires_at, Some(now + Duration::seconds(3600)));
    }

    #[tokio::test]
    async fn refresh_with_unrepresentable_lifetime_yields_token_without_expiry() {
        let mut store = MockCredentialStore::new();
        store
            .expect_save()
            .times(1)
            .withf(|_, c| c.access_token == "new-access" && c.expires_at.is_none())
            .returning(|_, _| Ok(()));
        let mut provider = MockOAuthProviderPort::new();
        provider.expect_refresh().returning(|_| {
            Ok(TokenGrant {
                expires_in: Some(i64::MAX),
                ..grant("new-access", None)
            })
        });

        let refresher = TokenRefresher::new(Arc::new(store), Arc::new(provider));
        let now = Utc::now();
        let renewed = refresher
            .ensure_valid_at(&UserId::new(), expired(now), now)
            .await
            .unwrap();
        assert_eq!(renewed.expires_at, None);
        assert_eq!(renewed.refresh_token.as_deref(), Some("refresh-1"));
    }

    #[tokio::test]
    async fn provider_supplied_refresh_token_replaces_old_one() {
        let mut store = MockCredentialStore::new();
        store.expect_save().times(1).returning(|_, _| Ok(()));
        let mut provider = MockOAuthProviderPort::new();
        provider
            .expect_refresh()
            .returning(|_| Ok(grant("new-access", Some("refresh-2"))));

        let refresher = TokenRefresher::new(Arc::new(store), Arc::new(provider));
        let now = Utc::now();
        let renewed = refresher
            .ensure_valid_at(&UserId::new(), expired(now), now)
            .await
            .unwrap();
        assert_eq!(renewed.refresh_token.as_deref(), Some("refresh-2"));
    }

    #[tokio::test]
    async fn expired_without_refresh_token_is_not_connected() {
        let refresher = TokenRefresher::new(
            Arc::new(MockCredentialStore::new()),
            Arc::new(MockOAuthProviderPort::new()),
        );
        let now = Utc::now();
        let cred = Credential::new("a").with_expires_at(now - Duration::hours(1));
        let err = refresher
            .ensure_valid_at(&UserId::new(), cred, now)
            .await
            .unwrap_err();
        assert_eq!(err, ConnectionError::NotConnected);
    }

    #[tokio::test]
    async fn provider_failure_becomes_refresh_failed() {
        let mut provider = MockOAuthProviderPort::new();
        provider
            .expect_refresh()
            .returning(|_| Err(ProviderError::Unavailable("503".to_string())));
        let refresher =
            TokenRefresher::new(Arc::new(MockCredentialStore::new()), Arc::new(provider));

        let now = Utc::now();
        let err = refresher
            .ensure_valid_at(&UserId::new(), expired(now), now)
            .await
            .unwrap_err();
        assert!(matches!(err, ConnectionError::RefreshFailed(_)));
    }

    #[tokio::test]
    async fn storage_failure_propagates() {
        let mut store = MockCredentialStore::new();
        store
            .expect_save()
            .returning(|_, _| Err(StorageError::Unavailable("disk full".to_string())));
        let mut provider = MockOAuthProviderPort::new();
        provider
            .expect_refresh()
            .returning(|_| Ok(grant("new-access", None)));
        let refresher = TokenRefresher::new(Arc::new(store), Arc::new(provider));

        let now = Utc::now();
        let err = refresher
            .ensure_valid_at(&UserId::new(), expired(now), now)
            .await
            .unwrap_err();
        assert!(matches!(err, ConnectionError::Storage(_)));
    }

    #[tokio::test]
    async fn missing_credential_is_not_connected() {
        let mut store = MockCredentialStore::new();
        store.expect_load().returning(|_| Ok(None));
        let refresher = TokenRefresher::new(Arc::new(store), Arc::new(MockOAuthProviderPort::new()));

        let err = refresher
            .valid_credential(&UserId::new())
            .await
            .unwrap_err();
        assert_eq!(err, ConnectionError::NotConnected);
    }
}
