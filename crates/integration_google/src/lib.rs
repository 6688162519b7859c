//! Google integration
//!
//! Thin clients for Google's OAuth2 token endpoint and the Calendar v3
//! events API (<https://developers.google.com/calendar/api/v3/reference>).
//! Only the calls needed to mirror a task as a single event are covered.

pub mod calendar;
mod error;
mod models;
pub mod oauth;

pub use calendar::{CalendarClient, GoogleCalendarClient, GoogleCalendarConfig};
pub use error::GoogleError;
pub use models::{EventDateTime, EventResource, ListEventsQuery, TokenResponse};
pub use oauth::{CALENDAR_EVENTS_SCOPE, GoogleOAuthClient, GoogleOAuthConfig, OAuthClient};
