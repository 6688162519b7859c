//! Google Calendar adapter - Implements CalendarPort using integration_google

use application::{
    ProviderError,
    ports::{CalendarAccess, CalendarPort},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{CalendarEvent, CalendarEventDescriptor, RemoteEventId};
use integration_google::{
    CalendarClient, EventDateTime, EventResource, GoogleCalendarClient, GoogleCalendarConfig,
    GoogleError, ListEventsQuery,
};
use tracing::{debug, instrument};

use super::google_oauth_adapter::map_google_error;

/// Title shown for events that have none
const UNTITLED_EVENT: &str = "No Title";

/// Adapter for the Google Calendar v3 events API
#[derive(Debug)]
pub struct GoogleCalendarAdapter {
    client: GoogleCalendarClient,
}

impl GoogleCalendarAdapter {
    /// Create an adapter for the given API settings
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to initialize.
    pub fn new(config: GoogleCalendarConfig) -> Result<Self, ProviderError> {
        let client = GoogleCalendarClient::new(config).map_err(map_google_error)?;
        Ok(Self { client })
    }

    /// Convert a task-derived descriptor into an event body
    fn to_resource(descriptor: &CalendarEventDescriptor) -> EventResource {
        EventResource {
            id: None,
            summary: Some(descriptor.title.clone()),
            description: Some(descriptor.description.clone()),
            start: Some(EventDateTime::utc(descriptor.start)),
            end: Some(EventDateTime::utc(descriptor.end)),
        }
    }

    /// Convert a listed event; events without an id are skipped
    fn to_event(resource: EventResource) -> Option<CalendarEvent> {
        let id = resource.id.filter(|id| !id.trim().is_empty())?;
        Some(CalendarEvent {
            id,
            summary: resource
                .summary
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| UNTITLED_EVENT.to_string()),
            start: resource
                .start
                .as_ref()
                .and_then(EventDateTime::as_display)
                .map(str::to_string),
            end: resource
                .end
                .as_ref()
                .and_then(EventDateTime::as_display)
                .map(str::to_string),
        })
    }
}

#[async_trait]
impl CalendarPort for GoogleCalendarAdapter {
    #[instrument(skip(self, access, event), fields(calendar_id = %access.calendar_id))]
    async fn insert_event(
        &self,
        access: &CalendarAccess,
        event: &CalendarEventDescriptor,
    ) -> Result<RemoteEventId, ProviderError> {
        let created = self
            .client
            .insert_event(
                &access.access_token,
                &access.calendar_id,
                &Self::to_resource(event),
            )
            .await
            .map_err(map_google_error)?;

        let id = created.id.unwrap_or_default();
        let id = RemoteEventId::new(id).map_err(|_| {
            ProviderError::InvalidResponse("created event has no id".to_string())
        })?;

        debug!(event_id = %id, "Inserted calendar event");
        Ok(id)
    }

    #[instrument(skip(self, access, event), fields(calendar_id = %access.calendar_id, event_id = %event_id))]
    async fn update_event(
        &self,
        access: &CalendarAccess,
        event_id: &RemoteEventId,
        event: &CalendarEventDescriptor,
    ) -> Result<(), ProviderError> {
        self.client
            .update_event(
                &access.access_token,
                &access.calendar_id,
                event_id.as_str(),
                &Self::to_resource(event),
            )
            .await
            .map_err(map_google_error)?;

        debug!("Updated calendar event");
        Ok(())
    }

    #[instrument(skip(self, access), fields(calendar_id = %access.calendar_id, event_id = %event_id))]
    async fn delete_event(
        &self,
        access: &CalendarAccess,
        event_id: &RemoteEventId,
    ) -> Result<(), ProviderError> {
        match self
            .client
            .delete_event(&access.access_token, &access.calendar_id, event_id.as_str())
            .await
        {
            Ok(()) => {
                debug!("Deleted calendar event");
                Ok(())
            },
            Err(GoogleError::NotFound(_)) => {
                debug!("Calendar event already gone");
                Ok(())
            },
            Err(e) => Err(map_google_error(e)),
        }
    }

    #[instrument(skip(self, access), fields(calendar_id = %access.calendar_id))]
    async fn list_events(
        &self,
        access: &CalendarAccess,
        from: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<CalendarEvent>, ProviderError> {
        let query = ListEventsQuery {
            time_min: from,
            max_results: limit,
        };

        let resources = self
            .client
            .list_events(&access.access_token, &access.calendar_id, query)
            .await
            .map_err(map_google_error)?;

        let events: Vec<CalendarEvent> = resources.into_iter().filter_map(Self::to_event).collect();
        debug!(count = events.len(), "Listed calendar events");
        Ok(events)
    }
}
