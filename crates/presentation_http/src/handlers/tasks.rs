//! Task sync handlers
//!
//! The surrounding application owns task CRUD. It reports each mutation
//! here, and users trigger manual sync or unlink from the task view. Every
//! handler returns the sync outcome plus the advisory message to show next
//! to the task operation's own result.

use application::{RequestContext, SyncOutcome, SyncReport, SyncTrigger};
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use domain::{Task, TaskId, UserId};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::{error::ApiError, state::AppState};

/// Task mutation reported by the task application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskMutation {
    Created,
    Updated,
    Deleted,
}

impl From<TaskMutation> for SyncTrigger {
    fn from(mutation: TaskMutation) -> Self {
        match mutation {
            TaskMutation::Created => Self::Created,
            TaskMutation::Updated => Self::Updated,
            TaskMutation::Deleted => Self::Deleted,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LifecycleRequest {
    pub mutation: TaskMutation,
}

/// Sync result for one task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncResponse {
    pub outcome: SyncOutcome,
    pub remote_event_id: Option<String>,
    pub message: String,
}

impl SyncResponse {
    fn from_report(report: &SyncReport, trigger: SyncTrigger) -> Self {
        Self {
            outcome: report.outcome.clone(),
            remote_event_id: report
                .link
                .remote_event_id()
                .map(|id| id.as_str().to_string()),
            message: report.advisory_message(trigger),
        }
    }
}

/// Run the sync operation matching a task mutation
#[instrument(skip(state, ctx, task_id, request), fields(user_id = %ctx.user_id(), request_id = %ctx.request_id(), task_id = %task_id))]
pub async fn lifecycle(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(task_id): Path<String>,
    Json(request): Json<LifecycleRequest>,
) -> Result<Json<SyncResponse>, ApiError> {
    run(&state, ctx.user_id(), &task_id, request.mutation.into()).await
}

/// Create or update the task's event on demand
#[instrument(skip(state, ctx, task_id), fields(user_id = %ctx.user_id(), request_id = %ctx.request_id(), task_id = %task_id))]
pub async fn manual_sync(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(task_id): Path<String>,
) -> Result<Json<SyncResponse>, ApiError> {
    run(&state, ctx.user_id(), &task_id, SyncTrigger::ManualSync).await
}

/// Delete the task's event and clear the link
#[instrument(skip(state, ctx, task_id), fields(user_id = %ctx.user_id(), request_id = %ctx.request_id(), task_id = %task_id))]
pub async fn remove_link(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(task_id): Path<String>,
) -> Result<Json<SyncResponse>, ApiError> {
    run(&state, ctx.user_id(), &task_id, SyncTrigger::RemoveLink).await
}

async fn run(
    state: &AppState,
    user_id: UserId,
    task_id: &str,
    trigger: SyncTrigger,
) -> Result<Json<SyncResponse>, ApiError> {
    let task = owned_task(state, user_id, task_id).await?;
    let report = state.sync.on_trigger(&user_id, &task, trigger).await;

    // A deleted task is removed by its owner right after; nothing to write back
    if trigger != SyncTrigger::Deleted && report.link != task.sync_link {
        let updated = state.tasks.set_sync_link(&task.id, &report.link).await?;
        if !updated {
            return Err(ApiError::NotFound(format!("Task {task_id}")));
        }
        debug!(state = report.link.label(), "Sync link saved");
    }

    Ok(Json(SyncResponse::from_report(&report, trigger)))
}

/// Load a task the caller owns; anything else looks like a missing task
async fn owned_task(state: &AppState, user_id: UserId, task_id: &str) -> Result<Task, ApiError> {
    let id = TaskId::parse(task_id)
        .map_err(|_| ApiError::BadRequest(format!("Invalid task id: {task_id}")))?;

    state
        .tasks
        .get(&id)
        .await?
        .filter(|task| task.is_owned_by(user_id))
        .ok_or_else(|| ApiError::NotFound(format!("Task {task_id}")))
}
