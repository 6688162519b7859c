//! Route definitions

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::{handlers, state::AppState};

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        // Calendar connection
        .route("/v1/calendar/status", get(handlers::calendar::status))
        .route("/v1/calendar/connect", get(handlers::calendar::connect))
        .route("/v1/calendar/callback", get(handlers::calendar::callback))
        .route("/v1/calendar/disconnect", post(handlers::calendar::disconnect))
        .route("/v1/calendar/events", get(handlers::calendar::upcoming_events))
        // Task sync
        .route(
            "/v1/tasks/{id}/calendar/lifecycle",
            post(handlers::tasks::lifecycle),
        )
        .route(
            "/v1/tasks/{id}/calendar/sync",
            post(handlers::tasks::manual_sync),
        )
        .route("/v1/tasks/{id}/calendar", delete(handlers::tasks::remove_link))
        .with_state(state)
}
