//! OAuth2 connect / disconnect lifecycle

use std::{fmt, sync::Arc};

use chrono::Utc;
use domain::{entities::Credential, value_objects::UserId};
use tracing::{info, instrument, warn};

use super::connection_status::ConnectionStatusQuery;
use crate::{
    error::{OAuthError, ProviderError, StorageError},
    ports::{CredentialStore, OAuthProviderPort},
};

/// What the connect endpoint should do for a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectDecision {
    /// Provider credentials are missing from configuration
    NotConfigured,
    /// The user already holds a usable connection
    AlreadyConnected,
    /// Send the user to the provider's consent page
    Redirect(String),
}

/// Builds consent URLs, exchanges authorization codes and disconnects users
pub struct OAuthFlowManager {
    provider: Arc<dyn OAuthProviderPort>,
    store: Arc<dyn CredentialStore>,
    status: Arc<ConnectionStatusQuery>,
}

impl fmt::Debug for OAuthFlowManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthFlowManager").finish_non_exhaustive()
    }
}

impl OAuthFlowManager {
    pub fn new(
        provider: Arc<dyn OAuthProviderPort>,
        store: Arc<dyn CredentialStore>,
        status: Arc<ConnectionStatusQuery>,
    ) -> Self {
        Self {
            provider,
            store,
            status,
        }
    }

    /// Client id, client secret and redirect URI are configured
    pub fn is_configured(&self) -> bool {
        self.provider.is_configured()
    }

    /// Consent URL for the calendar-events scope with offline access
    pub fn build_auth_url(&self) -> Result<String, OAuthError> {
        if !self.is_configured() {
            return Err(OAuthError::NotConfigured);
        }
        self.provider.authorization_url().map_err(|e| {
            warn!(error = %e, "Could not build authorization URL");
            OAuthError::NotConfigured
        })
    }

    /// Decide how to answer a connect request
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn connect(&self, user_id: &UserId) -> Result<ConnectDecision, OAuthError> {
        if !self.is_configured() {
            return Ok(ConnectDecision::NotConfigured);
        }
        if self.status.is_connected(user_id).await {
            info!("User is already connected");
            return Ok(ConnectDecision::AlreadyConnected);
        }
        self.build_auth_url().map(ConnectDecision::Redirect)
    }

    /// Exchange an authorization code and persist the resulting credential
    ///
    /// A previously stored refresh token survives when the new grant omits
    /// one. Nothing is stored when the provider rejects the code.
    #[instrument(skip(self, code), fields(user_id = %user_id))]
    pub async fn exchange_code(
        &self,
        user_id: &UserId,
        code: &str,
    ) -> Result<Credential, OAuthError> {
        if !self.is_configured() {
            return Err(OAuthError::NotConfigured);
        }
        if code.trim().is_empty() {
            return Err(OAuthError::ExchangeFailed(
                "authorization code is empty".to_string(),
            ));
        }

        let grant = self
            .provider
            .exchange_code(code)
            .await
            .map_err(|e| match e {
                ProviderError::Rejected { error, description } => {
                    warn!(%error, "Provider rejected authorization code");
                    OAuthError::ProviderRejected { error, description }
                },
                other => {
                    warn!(error = %other, "Authorization code exchange failed");
                    OAuthError::ExchangeFailed(other.to_string())
                },
            })?;

        let previous = self.store.load(user_id).await?;
        let credential = grant
            .into_credential(Utc::now())
            .carry_forward_refresh_token(previous.as_ref());
        if !credential.has_access_token() {
            return Err(OAuthError::ExchangeFailed(
                "provider returned an empty access token".to_string(),
            ));
        }

        self.store.save(user_id, &credential).await?;
        info!(
            has_refresh_token = credential.has_refresh_token(),
            "Calendar connected"
        );
        Ok(credential)
    }

    /// Forget the user's credential; idempotent
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn disconnect(&self, user_id: &UserId) -> Result<(), StorageError> {
        self.store.clear(user_id).await?;
        info!("Calendar disconnected");
        Ok(())
    }
}
