//! Calendar port for application layer
//!
//! A stateless view of the provider's events API. Every call receives an
//! immutable `CalendarAccess` instead of a client mutated with tokens, so one
//! adapter instance is safely shared across users.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{
    entities::{CalendarEvent, CalendarEventDescriptor},
    value_objects::RemoteEventId,
};
#[cfg(test)]
use mockall::automock;

use crate::error::ProviderError;

/// Per-call access: bearer token plus the target calendar
#[derive(Clone, PartialEq, Eq)]
pub struct CalendarAccess {
    pub access_token: String,
    pub calendar_id: String,
}

impl CalendarAccess {
    pub fn new(access_token: impl Into<String>, calendar_id: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            calendar_id: calendar_id.into(),
        }
    }
}

impl fmt::Debug for CalendarAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CalendarAccess")
            .field("access_token", &"[REDACTED]")
            .field("calendar_id", &self.calendar_id)
            .finish()
    }
}

/// Port for calendar event operations
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CalendarPort: Send + Sync {
    /// Create an event and return the identifier the provider assigned
    async fn insert_event(
        &self,
        access: &CalendarAccess,
        event: &CalendarEventDescriptor,
    ) -> Result<RemoteEventId, ProviderError>;

    /// Replace an existing event's title, description and times
    async fn update_event(
        &self,
        access: &CalendarAccess,
        event_id: &RemoteEventId,
        event: &CalendarEventDescriptor,
    ) -> Result<(), ProviderError>;

    /// Delete an event
    ///
    /// An event that is already gone counts as deleted.
    async fn delete_event(
        &self,
        access: &CalendarAccess,
        event_id: &RemoteEventId,
    ) -> Result<(), ProviderError>;

    /// Single events starting at or after `from`, ordered by start time
    async fn list_events(
        &self,
        access: &CalendarAccess,
        from: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<CalendarEvent>, ProviderError>;
}
