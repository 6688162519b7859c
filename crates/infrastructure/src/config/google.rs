//! Google Calendar configuration: OAuth client, endpoints, sync timeouts.

use std::time::Duration;

use application::CalendarSyncConfig;
use integration_google::{GoogleCalendarConfig, GoogleOAuthConfig};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Google Calendar sync configuration
///
/// The OAuth client is registered in the Google Cloud console; the redirect
/// URI must point at this server's `/v1/calendar/callback`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleCalendarAppConfig {
    /// OAuth client ID
    #[serde(default)]
    pub client_id: String,

    /// OAuth client secret (sensitive - uses `SecretString`)
    #[serde(default, skip_serializing)]
    pub client_secret: Option<SecretString>,

    /// Callback URL registered with Google
    #[serde(default)]
    pub redirect_uri: String,

    /// Calendar that receives task events
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,

    /// Consent page URL
    #[serde(default = "default_auth_url")]
    pub auth_url: String,

    /// Token endpoint URL
    #[serde(default = "default_token_url")]
    pub token_url: String,

    /// Calendar v3 API base URL
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Upper bound for one sync call, including token refresh
    #[serde(default = "default_sync_timeout")]
    pub sync_timeout_secs: u64,

    /// Events shown by the upcoming events listing
    #[serde(default = "default_upcoming_limit")]
    pub upcoming_limit: u32,
}

fn default_calendar_id() -> String {
    "primary".to_string()
}

fn default_auth_url() -> String {
    "https://accounts.google.com/o/oauth2/v2/auth".to_string()
}

fn default_token_url() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

fn default_api_base_url() -> String {
    "https://www.googleapis.com/calendar/v3".to_string()
}

const fn default_timeout() -> u64 {
    30
}

const fn default_sync_timeout() -> u64 {
    15
}

const fn default_upcoming_limit() -> u32 {
    application::DEFAULT_UPCOMING_LIMIT
}

impl Default for GoogleCalendarAppConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: None,
            redirect_uri: String::new(),
            calendar_id: default_calendar_id(),
            auth_url: default_auth_url(),
            token_url: default_token_url(),
            api_base_url: default_api_base_url(),
            timeout_secs: default_timeout(),
            sync_timeout_secs: default_sync_timeout(),
            upcoming_limit: default_upcoming_limit(),
        }
    }
}

impl GoogleCalendarAppConfig {
    /// Client id, client secret and redirect URI are all present
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.oauth_config().is_complete()
    }

    /// Settings for the OAuth token client
    #[must_use]
    pub fn oauth_config(&self) -> GoogleOAuthConfig {
        GoogleOAuthConfig {
            client_id: self.client_id.clone(),
            client_secret: self
                .client_secret
                .as_ref()
                .map(|s| s.expose_secret().to_string())
                .unwrap_or_default(),
            redirect_uri: self.redirect_uri.clone(),
            auth_url: self.auth_url.clone(),
            token_url: self.token_url.clone(),
            timeout_secs: self.timeout_secs,
        }
    }

    /// Settings for the Calendar v3 client
    #[must_use]
    pub fn calendar_config(&self) -> GoogleCalendarConfig {
        GoogleCalendarConfig {
            base_url: self.api_base_url.clone(),
            timeout_secs: self.timeout_secs,
        }
    }

    /// Settings for the sync engine
    #[must_use]
    pub fn sync_config(&self) -> CalendarSyncConfig {
        CalendarSyncConfig {
            calendar_id: self.calendar_id.clone(),
            call_timeout: Duration::from_secs(self.sync_timeout_secs),
            upcoming_limit: self.upcoming_limit,
        }
    }
}
