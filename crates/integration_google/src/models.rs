//! Wire types for the Google OAuth2 and Calendar v3 APIs

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Successful token endpoint response
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Only sent on the first consent unless `prompt=consent` forces it
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

impl std::fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .field("expires_in", &self.expires_in)
            .field("scope", &self.scope)
            .field("token_type", &self.token_type)
            .finish()
    }
}

/// Token endpoint body before we know whether it is an error
#[derive(Debug, Deserialize)]
pub(crate) struct RawTokenResponse {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
    pub scope: Option<String>,
    pub token_type: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Start or end of an event
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    /// RFC 3339 timestamp for timed events
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    /// `YYYY-MM-DD` for all-day events
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl EventDateTime {
    /// Timed event boundary in UTC
    pub fn utc(at: DateTime<Utc>) -> Self {
        Self {
            date_time: Some(at.to_rfc3339_opts(SecondsFormat::Secs, true)),
            date: None,
            time_zone: Some("UTC".to_string()),
        }
    }

    /// `dateTime`, falling back to `date` for all-day events
    pub fn as_display(&self) -> Option<&str> {
        self.date_time.as_deref().or(self.date.as_deref())
    }
}

/// Subset of the Calendar v3 `Event` resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<EventDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<EventDateTime>,
}

/// `events.list` response page
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EventsListResponse {
    #[serde(default)]
    pub items: Vec<EventResource>,
}

/// Filters for `events.list`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListEventsQuery {
    /// Lower bound on event end time
    pub time_min: DateTime<Utc>,
    pub max_results: u32,
}

impl ListEventsQuery {
    /// Query parameters: expanded recurring events ordered by start time
    pub(crate) fn to_params(self) -> Vec<(&'static str, String)> {
        vec![
            (
                "timeMin",
                self.time_min.to_rfc3339_opts(SecondsFormat::Secs, true),
            ),
            ("maxResults", self.max_results.to_string()),
            ("orderBy", "startTime".to_string()),
            ("singleEvents", "true".to_string()),
        ]
    }
}
