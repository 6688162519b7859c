//! OAuth2 provider port
//!
//! Covers the three provider endpoints the connection lifecycle needs:
//! the consent URL, authorization-code exchange and refresh.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::entities::Credential;
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// Tokens returned by the provider's token endpoint
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    /// Usually present only on the first grant
    pub refresh_token: Option<String>,
    /// Lifetime of the access token in seconds
    pub expires_in: Option<i64>,
    pub scope: Option<String>,
    pub token_type: Option<String>,
}

impl TokenGrant {
    /// Turn the grant into a credential, anchoring `expires_in` at `now`
    #[must_use]
    pub fn into_credential(self, now: DateTime<Utc>) -> Credential {
        let mut credential = Credential::new(self.access_token);
        credential.refresh_token = self.refresh_token.filter(|t| !t.trim().is_empty());
        credential.scope = self.scope;
        credential.token_type = self.token_type;
        if let Some(expires_in) = self.expires_in {
            credential = credential.with_expires_in(now, expires_in);
        }
        credential
    }
}

impl std::fmt::Debug for TokenGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenGrant")
            .field("access_token", &"[REDACTED]")
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("expires_in", &self.expires_in)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

/// Port for the provider's OAuth2 endpoints
#[cfg_attr(test, automock)]
#[async_trait]
pub trait OAuthProviderPort: Send + Sync {
    /// Client id, client secret and redirect URI are all present
    ///
    /// Pure predicate over configuration; performs no I/O.
    fn is_configured(&self) -> bool;

    /// Consent URL requesting offline access and a forced consent prompt
    fn authorization_url(&self) -> Result<String, ProviderError>;

    /// Exchange an authorization code for tokens
    async fn exchange_code(&self, code: &str) -> Result<TokenGrant, ProviderError>;

    /// Mint a new access token from a refresh token
    async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn _assert_object_safe(_: &dyn OAuthProviderPort) {}

    #[test]
    fn trait_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn OAuthProviderPort>();
    }

    #[test]
    fn grant_into_credential_sets_expiry() {
        let now = Utc::now();
        let grant = TokenGrant {
            access_token: "at".to_string(),
            refresh_token: Some("rt".to_string()),
            expires_in: Some(3600),
            scope: Some("calendar.events".to_string()),
            token_type: Some("Bearer".to_string()),
        };
        let credential = grant.into_credential(now);
        assert_eq!(credential.access_token, "at");
        assert_eq!(credential.refresh_token.as_deref(), Some("rt"));
        assert_eq!(
            credential.expires_at,
            Some(now + chrono::Duration::seconds(3600))
        );
        assert_eq!(credential.token_type.as_deref(), Some("Bearer"));
    }

    #[test]
    fn blank_refresh_token_is_dropped() {
        let grant = TokenGrant {
            access_token: "at".to_string(),
            refresh_token: Some(String::new()),
            expires_in: None,
            scope: None,
            token_type: None,
        };
        let credential = grant.into_credential(Utc::now());
        assert!(credential.refresh_token.is_none());
        assert!(credential.expires_at.is_none());
    }

    #[test]
    fn debug_hides_access_token() {
        let grant = TokenGrant {
            access_token: "very-secret".to_string(),
            refresh_token: None,
            expires_in: None,
            scope: None,
            token_type: None,
        };
        assert!(!format!("{grant:?}").contains("very-secret"));
    }
}
