//! Google client errors

use reqwest::StatusCode;
use thiserror::Error;

/// Errors returned by the Google clients
#[derive(Debug, Error)]
pub enum GoogleError {
    /// HTTP client could not be built or the connection failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request failed with a non-success status
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Response body could not be parsed
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Token endpoint returned an OAuth `error` field
    #[error("OAuth error: {error}")]
    OAuth {
        error: String,
        description: Option<String>,
    },

    /// Access token rejected (HTTP 401)
    #[error("Unauthorized")]
    Unauthorized,

    /// Resource missing or already deleted (HTTP 404 / 410)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Service is temporarily unavailable
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Client settings are unusable (missing id, malformed endpoint, ...)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl GoogleError {
    /// Map a non-success HTTP status
    pub(crate) fn from_status(status: StatusCode, resource: &str) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized,
            StatusCode::NOT_FOUND | StatusCode::GONE => Self::NotFound(resource.to_string()),
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimitExceeded,
            s if s.is_server_error() => Self::ServiceUnavailable(format!("HTTP {s}")),
            s => Self::RequestFailed(format!("HTTP {s}")),
        }
    }

    /// Map a transport error from reqwest
    pub(crate) fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            Self::ServiceUnavailable(err.to_string())
        } else {
            Self::RequestFailed(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert!(matches!(
            GoogleError::from_status(StatusCode::UNAUTHORIZED, "x"),
            GoogleError::Unauthorized
        ));
        assert!(matches!(
            GoogleError::from_status(StatusCode::GONE, "evt"),
            GoogleError::NotFound(id) if id == "evt"
        ));
        assert!(matches!(
            GoogleError::from_status(StatusCode::TOO_MANY_REQUESTS, "x"),
            GoogleError::RateLimitExceeded
        ));
        assert!(matches!(
            GoogleError::from_status(StatusCode::BAD_GATEWAY, "x"),
            GoogleError::ServiceUnavailable(_)
        ));
        assert!(matches!(
            GoogleError::from_status(StatusCode::FORBIDDEN, "x"),
            GoogleError::RequestFailed(_)
        ));
    }

    #[test]
    fn oauth_error_display() {
        let err = GoogleError::OAuth {
            error: "invalid_grant".to_string(),
            description: None,
        };
        assert_eq!(err.to_string(), "OAuth error: invalid_grant");
    }
}
