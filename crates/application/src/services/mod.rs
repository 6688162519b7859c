//! Application services - Use case implementations

mod calendar_sync;
mod connection_status;
mod oauth_flow;
mod sync_report;
mod token_refresher;

pub use calendar_sync::{
    CalendarSyncConfig, CalendarSyncEngine, DEFAULT_CALL_TIMEOUT, DEFAULT_UPCOMING_LIMIT,
    UpcomingEvents,
};
pub use connection_status::{ConnectionStatus, ConnectionStatusQuery};
pub use oauth_flow::{ConnectDecision, OAuthFlowManager};
pub use sync_report::{SyncAction, SyncOutcome, SyncReport, SyncTrigger};
pub use token_refresher::TokenRefresher;
