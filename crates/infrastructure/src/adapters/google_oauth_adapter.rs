//! Google OAuth adapter - Implements OAuthProviderPort using integration_google

use application::{
    ProviderError,
    ports::{OAuthProviderPort, TokenGrant},
};
use async_trait::async_trait;
use integration_google::{
    GoogleError, GoogleOAuthClient, GoogleOAuthConfig, OAuthClient, TokenResponse,
};
use tracing::{debug, instrument};

/// Adapter for Google's OAuth2 endpoints
#[derive(Debug)]
pub struct GoogleOAuthAdapter {
    client: GoogleOAuthClient,
}

impl GoogleOAuthAdapter {
    /// Create an adapter for the given client settings
    ///
    /// An incomplete configuration is accepted; the adapter then reports
    /// itself as not configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to initialize.
    pub fn new(config: GoogleOAuthConfig) -> Result<Self, ProviderError> {
        let client = GoogleOAuthClient::new(config).map_err(map_google_error)?;
        Ok(Self { client })
    }
}

/// Map integration Google errors to provider errors
pub(crate) fn map_google_error(err: GoogleError) -> ProviderError {
    match err {
        GoogleError::OAuth { error, description } => {
            ProviderError::Rejected { error, description }
        },
        GoogleError::Unauthorized => ProviderError::Unauthorized,
        GoogleError::NotFound(resource) => ProviderError::NotFound(resource),
        GoogleError::RateLimitExceeded => ProviderError::RateLimited,
        GoogleError::ConnectionFailed(e) | GoogleError::ServiceUnavailable(e) => {
            ProviderError::Unavailable(e)
        },
        GoogleError::ParseError(e) => ProviderError::InvalidResponse(e),
        GoogleError::RequestFailed(e) => ProviderError::RequestFailed(e),
        GoogleError::InvalidConfig(e) => {
            ProviderError::RequestFailed(format!("invalid configuration: {e}"))
        },
    }
}

fn to_grant(response: TokenResponse) -> TokenGrant {
    TokenGrant {
        access_token: response.access_token,
        refresh_token: response.refresh_token,
        expires_in: response.expires_in,
        scope: response.scope,
        token_type: response.token_type,
    }
}

#[async_trait]
impl OAuthProviderPort for GoogleOAuthAdapter {
    fn is_configured(&self) -> bool {
        self.client.is_configured()
    }

    fn authorization_url(&self) -> Result<String, ProviderError> {
        self.client.authorization_url().map_err(map_google_error)
    }

    #[instrument(skip(self, code))]
    async fn exchange_code(&self, code: &str) -> Result<TokenGrant, ProviderError> {
        let response = self
            .client
            .exchange_code(code)
            .await
            .map_err(map_google_error)?;

        debug!(
            has_refresh_token = response.refresh_token.is_some(),
            "Exchanged authorization code"
        );
        Ok(to_grant(response))
    }

    #[instrument(skip(self, refresh_token))]
    async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant, ProviderError> {
        let response = self
            .client
            .refresh_token(refresh_token)
            .await
            .map_err(map_google_error)?;

        debug!(expires_in = ?response.expires_in, "Refreshed access token");
        Ok(to_grant(response))
    }
}
