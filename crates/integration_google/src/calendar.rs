//! Google Calendar v3 events client

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

use crate::{
    error::GoogleError,
    models::{EventResource, EventsListResponse, ListEventsQuery},
};

/// Calendar API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleCalendarConfig {
    /// API base URL (default: <https://www.googleapis.com/calendar/v3>)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://www.googleapis.com/calendar/v3".to_string()
}

const fn default_timeout() -> u64 {
    30
}

impl Default for GoogleCalendarConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Stateless events API; the caller passes the bearer token on every call
#[async_trait]
pub trait CalendarClient: Send + Sync {
    /// `events.insert`
    async fn insert_event(
        &self,
        access_token: &str,
        calendar_id: &str,
        event: &EventResource,
    ) -> Result<EventResource, GoogleError>;

    /// `events.update` (full replacement)
    async fn update_event(
        &self,
        access_token: &str,
        calendar_id: &str,
        event_id: &str,
        event: &EventResource,
    ) -> Result<EventResource, GoogleError>;

    /// `events.delete`
    async fn delete_event(
        &self,
        access_token: &str,
        calendar_id: &str,
        event_id: &str,
    ) -> Result<(), GoogleError>;

    /// `events.list`
    async fn list_events(
        &self,
        access_token: &str,
        calendar_id: &str,
        query: ListEventsQuery,
    ) -> Result<Vec<EventResource>, GoogleError>;
}

/// Google Calendar HTTP client implementation
#[derive(Debug)]
pub struct GoogleCalendarClient {
    client: Client,
    config: GoogleCalendarConfig,
}

impl GoogleCalendarClient {
    /// Create a new Calendar client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: GoogleCalendarConfig) -> Result<Self, GoogleError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GoogleError::ConnectionFailed(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// `{base}/calendars/{calendar_id}/events[/{event_id}]`, segments percent-encoded
    fn events_url(&self, calendar_id: &str, event_id: Option<&str>) -> Result<Url, GoogleError> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| GoogleError::InvalidConfig(format!("base_url: {e}")))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| GoogleError::InvalidConfig("base_url cannot be a base".to_string()))?;
            segments.pop_if_empty().extend(["calendars", calendar_id, "events"]);
            if let Some(id) = event_id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    async fn send(
        request: RequestBuilder,
        resource: &str,
    ) -> Result<reqwest::Response, GoogleError> {
        let response = request
            .send()
            .await
            .map_err(|e| GoogleError::from_transport(&e))?;

        let status = response.status();
        if !status.is_success() {
            debug!(%status, resource, "Calendar API returned an error status");
            return Err(GoogleError::from_status(status, resource));
        }
        Ok(response)
    }

    async fn send_for_event(
        request: RequestBuilder,
        resource: &str,
    ) -> Result<EventResource, GoogleError> {
        Self::send(request, resource)
            .await?
            .json()
            .await
            .map_err(|e| GoogleError::ParseError(e.to_string()))
    }
}

#[async_trait]
impl CalendarClient for GoogleCalendarClient {
    #[instrument(skip(self, access_token, event))]
    async fn insert_event(
        &self,
        access_token: &str,
        calendar_id: &str,
        event: &EventResource,
    ) -> Result<EventResource, GoogleError> {
        let url = self.events_url(calendar_id, None)?;
        let request = self.client.post(url).bearer_auth(access_token).json(event);
        Self::send_for_event(request, "event").await
    }

    #[instrument(skip(self, access_token, event))]
    async fn update_event(
        &self,
        access_token: &str,
        calendar_id: &str,
        event_id: &str,
        event: &EventResource,
    ) -> Result<EventResource, GoogleError> {
        let url = self.events_url(calendar_id, Some(event_id))?;
        let request = self.client.put(url).bearer_auth(access_token).json(event);
        Self::send_for_event(request, event_id).await
    }

    #[instrument(skip(self, access_token))]
    async fn delete_event(
        &self,
        access_token: &str,
        calendar_id: &str,
        event_id: &str,
    ) -> Result<(), GoogleError> {
        let url = self.events_url(calendar_id, Some(event_id))?;
        let request = self.client.delete(url).bearer_auth(access_token);
        Self::send(request, event_id).await?;
        Ok(())
    }

    #[instrument(skip(self, access_token))]
    async fn list_events(
        &self,
        access_token: &str,
        calendar_id: &str,
        query: ListEventsQuery,
    ) -> Result<Vec<EventResource>, GoogleError> {
        let url = self.events_url(calendar_id, None)?;
        let request = self
            .client
            .get(url)
            .bearer_auth(access_token)
            .query(&query.to_params());

        let page: EventsListResponse = Self::send(request, "events")
            .await?
            .json()
            .await
            .map_err(|e| GoogleError::ParseError(e.to_string()))?;
        Ok(page.items)
    }
}
