//! Application-level errors
//!
//! Provider failures never leave the sync engine as errors; they are folded
//! into a `SyncOutcome`. `StorageError` is the only category allowed to
//! surface as fatal.

use thiserror::Error;

/// Local persistence failure
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    /// Backend could not be reached (pool exhausted, file locked, ...)
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// A query or statement failed
    #[error("Storage query failed: {0}")]
    Query(String),

    /// Stored data could not be decoded
    #[error("Stored data is corrupt: {0}")]
    Corrupt(String),
}

/// Errors from a call to the calendar provider
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// The provider answered with an explicit OAuth `error` field
    #[error("Provider rejected the request: {error}")]
    Rejected {
        error: String,
        description: Option<String>,
    },

    /// The access token was not accepted
    #[error("Provider authentication failed")]
    Unauthorized,

    /// Resource not found at the provider
    #[error("Not found at provider: {0}")]
    NotFound(String),

    /// Rate limit exceeded
    #[error("Provider rate limit exceeded")]
    RateLimited,

    /// Provider returned a 5xx or could not be reached
    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    /// The call did not complete within the configured bound
    #[error("Provider call timed out")]
    Timeout,

    /// Any other failed request
    #[error("Provider request failed: {0}")]
    RequestFailed(String),

    /// The response could not be interpreted
    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
}

/// Why a user has no usable calendar connection
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConnectionError {
    /// No credential, or an expired one without a refresh token
    #[error("Not connected to the calendar provider")]
    NotConnected,

    /// The provider refused or failed to renew the access token
    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors from the OAuth connect flow
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OAuthError {
    /// Client id, secret or redirect URI is missing
    #[error("Calendar provider is not configured")]
    NotConfigured,

    /// Token endpoint answered with an `error` field
    #[error("Authorization rejected by provider: {error}")]
    ProviderRejected {
        error: String,
        description: Option<String>,
    },

    /// Token exchange failed for any other reason
    #[error("Authorization code exchange failed: {0}")]
    ExchangeFailed(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ProviderError {
    /// Transient failures a later manual sync may get past
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RateLimited | Self::Unavailable(_) | Self::Timeout
        )
    }
}
