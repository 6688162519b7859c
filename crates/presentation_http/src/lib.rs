//! HTTP presentation layer
//!
//! Axum routes for connecting a Google Calendar and syncing tasks to it.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::{ApiError, set_expose_internal_errors};
pub use middleware::{ApiKeyAuthLayer, LOCAL_USER_ID, RequestIdLayer};
pub use routes::create_router;
pub use state::AppState;
