//! Infrastructure adapters
//!
//! Adapters connect application ports to concrete implementations.

mod api_key_hasher;
mod google_calendar_adapter;
mod google_oauth_adapter;

pub use api_key_hasher::{ApiKeyHashError, ApiKeyHasher};
pub use google_calendar_adapter::GoogleCalendarAdapter;
pub use google_oauth_adapter::GoogleOAuthAdapter;
