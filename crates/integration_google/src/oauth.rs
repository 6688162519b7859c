//! Google OAuth2 client
//!
//! Builds the consent URL and talks to the token endpoint for code exchange
//! and refresh.

use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::{
    error::GoogleError,
    models::{RawTokenResponse, TokenResponse},
};

/// Scope limited to creating and editing events
pub const CALENDAR_EVENTS_SCOPE: &str = "https://www.googleapis.com/auth/calendar.events";

/// OAuth client configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct GoogleOAuthConfig {
    #[serde(default)]
    pub client_id: String,

    #[serde(default, skip_serializing)]
    pub client_secret: String,

    /// Callback URL registered with Google
    #[serde(default)]
    pub redirect_uri: String,

    /// Consent page (default: <https://accounts.google.com/o/oauth2/v2/auth>)
    #[serde(default = "default_auth_url")]
    pub auth_url: String,

    /// Token endpoint (default: <https://oauth2.googleapis.com/token>)
    #[serde(default = "default_token_url")]
    pub token_url: String,

    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_auth_url() -> String {
    "https://accounts.google.com/o/oauth2/v2/auth".to_string()
}

fn default_token_url() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

const fn default_timeout() -> u64 {
    30
}

impl Default for GoogleOAuthConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: String::new(),
            auth_url: default_auth_url(),
            token_url: default_token_url(),
            timeout_secs: default_timeout(),
        }
    }
}

impl fmt::Debug for GoogleOAuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleOAuthConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("redirect_uri", &self.redirect_uri)
            .field("auth_url", &self.auth_url)
            .field("token_url", &self.token_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl GoogleOAuthConfig {
    /// Client id, secret and redirect URI are all non-empty
    pub fn is_complete(&self) -> bool {
        [&self.client_id, &self.client_secret, &self.redirect_uri]
            .iter()
            .all(|v| !v.trim().is_empty())
    }
}

/// OAuth client trait
#[async_trait]
pub trait OAuthClient: Send + Sync {
    /// Whether the client has everything it needs to talk to Google
    fn is_configured(&self) -> bool;

    /// Consent URL with offline access, forced consent and incremental scopes
    fn authorization_url(&self) -> Result<String, GoogleError>;

    /// `grant_type=authorization_code`
    async fn exchange_code(&self, code: &str) -> Result<TokenResponse, GoogleError>;

    /// `grant_type=refresh_token`
    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenResponse, GoogleError>;
}

/// Google OAuth HTTP client implementation
#[derive(Debug)]
pub struct GoogleOAuthClient {
    client: Client,
    config: GoogleOAuthConfig,
}

impl GoogleOAuthClient {
    /// Create a new OAuth client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: GoogleOAuthConfig) -> Result<Self, GoogleError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GoogleError::ConnectionFailed(e.to_string()))?;

        Ok(Self { client, config })
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<TokenResponse, GoogleError> {
        if !self.is_configured() {
            return Err(GoogleError::InvalidConfig(
                "client id, client secret and redirect URI are required".to_string(),
            ));
        }

        let response = self
            .client
            .post(&self.config.token_url)
            .form(form)
            .send()
            .await
            .map_err(|e| GoogleError::from_transport(&e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GoogleError::ParseError(e.to_string()))?;

        let raw: Option<RawTokenResponse> = serde_json::from_str(&body).ok();

        if let Some(error) = raw.as_ref().and_then(|r| r.error.clone()) {
            let description = raw.as_ref().and_then(|r| r.error_description.clone());
            warn!(%status, %error, "Token endpoint returned an error");
            return Err(GoogleError::OAuth { error, description });
        }
        if !status.is_success() {
            return Err(GoogleError::from_status(status, "token"));
        }

        let raw =
            raw.ok_or_else(|| GoogleError::ParseError("token response is not JSON".to_string()))?;
        let access_token = raw
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| GoogleError::ParseError("missing access_token".to_string()))?;

        Ok(TokenResponse {
            access_token,
            refresh_token: raw.refresh_token,
            expires_in: raw.expires_in,
            scope: raw.scope,
            token_type: raw.token_type,
        })
    }
}

#[async_trait]
impl OAuthClient for GoogleOAuthClient {
    fn is_configured(&self) -> bool {
        self.config.is_complete()
    }

    fn authorization_url(&self) -> Result<String, GoogleError> {
        if !self.is_configured() {
            return Err(GoogleError::InvalidConfig(
                "client id, client secret and redirect URI are required".to_string(),
            ));
        }

        let url = Url::parse_with_params(
            &self.config.auth_url,
            &[
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", CALENDAR_EVENTS_SCOPE),
                ("access_type", "offline"),
                ("prompt", "consent"),
                ("include_granted_scopes", "true"),
            ],
        )
        .map_err(|e| GoogleError::InvalidConfig(format!("auth_url: {e}")))?;

        Ok(url.into())
    }

    #[instrument(skip(self, code))]
    async fn exchange_code(&self, code: &str) -> Result<TokenResponse, GoogleError> {
        debug!("Exchanging authorization code");
        self.token_request(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ])
        .await
    }

    #[instrument(skip(self, refresh_token))]
    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenResponse, GoogleError> {
        debug!("Refreshing access token");
        self.token_request(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
        ])
        .await
    }
}
