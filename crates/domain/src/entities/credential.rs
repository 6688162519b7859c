//! OAuth2 credential bundle held for one user

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Seconds before `expires_at` at which a token is already treated as expired
pub const EXPIRY_SKEW_SECS: i64 = 30;

/// Stored OAuth2 token pair plus expiry
///
/// A credential with a refresh token can always be revived, even when the
/// access token has expired. A credential with neither token is equivalent to
/// "disconnected".
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Short-lived bearer token for API calls
    pub access_token: String,
    /// Long-lived token used to mint new access tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// When the access token stops being accepted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    /// Granted scopes, space separated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// Token type reported by the provider (usually `Bearer`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

impl Credential {
    /// Create a credential holding only an access token
    #[must_use]
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            expires_at: None,
            scope: None,
            token_type: None,
        }
    }

    /// Set the refresh token
    #[must_use]
    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    /// Set an absolute expiry
    #[must_use]
    pub const fn with_expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Set the expiry relative to `now` from a provider's `expires_in`
    ///
    /// A lifetime too large to represent means no expiry; one too far in
    /// the past means already expired.
    #[must_use]
    pub fn with_expires_in(mut self, now: DateTime<Utc>, expires_in_secs: i64) -> Self {
        let expires_at = Duration::try_seconds(expires_in_secs)
            .and_then(|lifetime| now.checked_add_signed(lifetime));
        self.expires_at = match expires_at {
            Some(at) => Some(at),
            None if expires_in_secs > 0 => None,
            None => Some(now),
        };
        self
    }

    /// Set the granted scope
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Set the token type
    #[must_use]
    pub fn with_token_type(mut self, token_type: impl Into<String>) -> Self {
        self.token_type = Some(token_type.into());
        self
    }

    /// Whether a non-empty access token is present
    #[must_use]
    pub fn has_access_token(&self) -> bool {
        !self.access_token.trim().is_empty()
    }

    /// Whether a non-empty refresh token is present
    #[must_use]
    pub fn has_refresh_token(&self) -> bool {
        self.refresh_token
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty())
    }

    /// Check expiry against `now`, including the skew margin
    ///
    /// A missing access token counts as expired. A missing expiry does not.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        if !self.has_access_token() {
            return true;
        }
        self.expires_at.is_some_and(|expires_at| {
            now.checked_add_signed(Duration::seconds(EXPIRY_SKEW_SECS))
                .is_none_or(|deadline| deadline >= expires_at)
        })
    }

    /// Neither token is usable
    #[must_use]
    pub fn is_disconnected(&self) -> bool {
        !self.has_access_token() && !self.has_refresh_token()
    }

    /// Keep `previous`'s refresh token when this grant came without one
    ///
    /// Providers usually send a refresh token only on the first grant, so a
    /// renewal must never drop the one already held.
    #[must_use]
    pub fn carry_forward_refresh_token(mut self, previous: Option<&Self>) -> Self {
        if !self.has_refresh_token() {
            self.refresh_token = previous
                .filter(|p| p.has_refresh_token())
                .and_then(|p| p.refresh_token.clone());
        }
        self
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"[REDACTED]")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("expires_at", &self.expires_at)
            .field("scope", &self.scope)
            .field("token_type", &self.token_type)
            .finish()
    }
}
