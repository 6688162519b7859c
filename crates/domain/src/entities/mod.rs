//! Domain entities - Objects with identity and lifecycle

mod calendar_event;
mod credential;
mod task;

pub use calendar_event::{CalendarEvent, CalendarEventDescriptor, EVENT_DURATION_MINUTES};
pub use credential::{Credential, EXPIRY_SKEW_SECS};
pub use task::{SyncLink, Task};
