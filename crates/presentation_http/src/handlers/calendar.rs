//! Calendar connection handlers
//!
//! Connect, OAuth callback, disconnect, status and the upcoming-events list.
//! All of them act on the user from the authenticated `RequestContext`.

use application::{ConnectDecision, ConnectionStatus, OAuthError, RequestContext, SyncOutcome};
use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use domain::CalendarEvent;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::{error::ApiError, state::AppState};

/// Outcome of a connection action, in words
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    fn ok(message: &str) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.to_string(),
        })
    }

    fn failed(message: &str) -> Json<Self> {
        Json(Self {
            success: false,
            message: message.to_string(),
        })
    }
}

/// Query string the provider appends to the redirect URI
#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EventsParams {
    pub limit: Option<u32>,
}

/// Upcoming events plus how the lookup went
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsResponse {
    pub outcome: SyncOutcome,
    pub events: Vec<CalendarEvent>,
}

/// `{connected, configured}` for the caller
#[instrument(skip(state, ctx), fields(user_id = %ctx.user_id()))]
pub async fn status(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Json<ConnectionStatus> {
    Json(state.status.status(&ctx.user_id()).await)
}

/// Redirect to the provider's consent page unless there is nothing to do
#[instrument(skip(state, ctx), fields(user_id = %ctx.user_id()))]
pub async fn connect(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Response, ApiError> {
    let response = match state.oauth.connect(&ctx.user_id()).await? {
        ConnectDecision::NotConfigured => (
            StatusCode::SERVICE_UNAVAILABLE,
            MessageResponse::failed("Google Calendar is not configured."),
        )
            .into_response(),
        ConnectDecision::AlreadyConnected => {
            MessageResponse::ok("Already connected!").into_response()
        },
        ConnectDecision::Redirect(url) => Redirect::to(&url).into_response(),
    };
    Ok(response)
}

/// Finish the OAuth flow with the code the provider sent back
#[instrument(skip(state, ctx, params), fields(user_id = %ctx.user_id()))]
pub async fn callback(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Query(params): Query<CallbackParams>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    if let Some(error) = params.error {
        info!(%error, "User denied calendar access");
        return Ok((StatusCode::BAD_REQUEST, MessageResponse::failed("Access denied.")));
    }

    let Some(code) = params.code.filter(|c| !c.trim().is_empty()) else {
        return Ok((
            StatusCode::BAD_REQUEST,
            MessageResponse::failed("No code returned."),
        ));
    };

    match state.oauth.exchange_code(&ctx.user_id(), &code).await {
        Ok(_) => Ok((StatusCode::OK, MessageResponse::ok("Google Calendar connected!"))),
        Err(OAuthError::Storage(e)) => Err(e.into()),
        Err(OAuthError::NotConfigured) => Ok((
            StatusCode::SERVICE_UNAVAILABLE,
            MessageResponse::failed("Google Calendar is not configured."),
        )),
        Err(e) => {
            warn!(error = %e, "Calendar connection failed");
            Ok((
                StatusCode::BAD_GATEWAY,
                MessageResponse::failed("Failed to connect to Google Calendar."),
            ))
        },
    }
}

/// Forget the caller's credential
#[instrument(skip(state, ctx), fields(user_id = %ctx.user_id()))]
pub async fn disconnect(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.oauth.disconnect(&ctx.user_id()).await?;
    Ok(MessageResponse::ok("Disconnected successfully!"))
}

/// Next events on the caller's calendar
#[instrument(skip(state, ctx, params), fields(user_id = %ctx.user_id()))]
pub async fn upcoming_events(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Query(params): Query<EventsParams>,
) -> Json<EventsResponse> {
    let upcoming = state
        .sync
        .upcoming_events(&ctx.user_id(), params.limit)
        .await;
    Json(EventsResponse {
        outcome: upcoming.outcome,
        events: upcoming.events,
    })
}
