//! Calendar sync engine
//!
//! Keeps one task's remote calendar event consistent with the task. Every
//! operation is best effort: provider failures become a `SyncOutcome` and the
//! link is left exactly as it was. Callers persist the returned link.

use std::{fmt, future::Future, sync::Arc, time::Duration};

use chrono::Utc;
use domain::{
    entities::{CalendarEvent, CalendarEventDescriptor, SyncLink, Task},
    value_objects::{RemoteEventId, UserId},
};
use tracing::{debug, info, instrument, warn};

use super::{
    connection_status::ConnectionStatusQuery,
    sync_report::{SyncAction, SyncOutcome, SyncReport, SyncTrigger},
};
use crate::{
    error::ProviderError,
    ports::{CalendarAccess, CalendarPort},
};

/// Default bound on a single provider call
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(15);

/// Default number of upcoming events listed
pub const DEFAULT_UPCOMING_LIMIT: u32 = 5;

/// Sync engine settings
#[derive(Debug, Clone)]
pub struct CalendarSyncConfig {
    /// Target calendar; the provider's `primary` calendar by default
    pub calendar_id: String,
    /// Elapsed calls are reported as `Failed`
    pub call_timeout: Duration,
    pub upcoming_limit: u32,
}

impl Default for CalendarSyncConfig {
    fn default() -> Self {
        Self {
            calendar_id: "primary".to_string(),
            call_timeout: DEFAULT_CALL_TIMEOUT,
            upcoming_limit: DEFAULT_UPCOMING_LIMIT,
        }
    }
}

/// Upcoming events together with how the lookup went
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpcomingEvents {
    pub outcome: SyncOutcome,
    pub events: Vec<CalendarEvent>,
}

/// Maps task lifecycle events onto remote event operations
pub struct CalendarSyncEngine {
    status: Arc<ConnectionStatusQuery>,
    calendar: Arc<dyn CalendarPort>,
    config: CalendarSyncConfig,
}

impl fmt::Debug for CalendarSyncEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CalendarSyncEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl CalendarSyncEngine {
    pub fn new(
        status: Arc<ConnectionStatusQuery>,
        calendar: Arc<dyn CalendarPort>,
        config: CalendarSyncConfig,
    ) -> Self {
        Self {
            status,
            calendar,
            config,
        }
    }

    /// Override the per-call timeout
    #[must_use]
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.config.call_timeout = timeout;
        self
    }

    /// Run the operation matching `trigger`
    pub async fn on_trigger(
        &self,
        user_id: &UserId,
        task: &Task,
        trigger: SyncTrigger,
    ) -> SyncReport {
        match trigger {
            SyncTrigger::Created => self.on_create(user_id, task).await,
            SyncTrigger::Updated => self.on_update(user_id, task).await,
            SyncTrigger::Deleted => self.on_delete(user_id, task).await,
            SyncTrigger::ManualSync => self.manual_sync(user_id, task).await,
            SyncTrigger::RemoveLink => self.remove_link(user_id, task).await,
        }
    }

    /// Create the remote event for a new task
    #[instrument(skip(self, task), fields(user_id = %user_id, task_id = %task.id))]
    pub async fn on_create(&self, user_id: &UserId, task: &Task) -> SyncReport {
        match self.access(user_id).await {
            Ok(access) => self.create_remote(&access, task).await,
            Err(outcome) => skipped(task, outcome),
        }
    }

    /// Push task changes; an unlinked task gets a fresh event
    #[instrument(skip(self, task), fields(user_id = %user_id, task_id = %task.id))]
    pub async fn on_update(&self, user_id: &UserId, task: &Task) -> SyncReport {
        let access = match self.access(user_id).await {
            Ok(access) => access,
            Err(outcome) => return skipped(task, outcome),
        };

        match &task.sync_link {
            SyncLink::Unsynced => self.create_remote(&access, task).await,
            SyncLink::Synced(event_id) => self.update_remote(&access, task, event_id).await,
        }
    }

    /// Delete the remote event of a task being deleted
    ///
    /// The caller deletes the task whatever this reports.
    #[instrument(skip(self, task), fields(user_id = %user_id, task_id = %task.id))]
    pub async fn on_delete(&self, user_id: &UserId, task: &Task) -> SyncReport {
        self.delete_linked(user_id, task).await
    }

    /// User-requested sync, valid at any time
    #[instrument(skip(self, task), fields(user_id = %user_id, task_id = %task.id))]
    pub async fn manual_sync(&self, user_id: &UserId, task: &Task) -> SyncReport {
        self.on_update(user_id, task).await
    }

    /// Remove the remote event but keep the task
    #[instrument(skip(self, task), fields(user_id = %user_id, task_id = %task.id))]
    pub async fn remove_link(&self, user_id: &UserId, task: &Task) -> SyncReport {
        self.delete_linked(user_id, task).await
    }

    /// The next events on the user's calendar, starting now
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn upcoming_events(&self, user_id: &UserId, limit: Option<u32>) -> UpcomingEvents {
        let access = match self.access(user_id).await {
            Ok(access) => access,
            Err(outcome) => {
                return UpcomingEvents {
                    outcome,
                    events: Vec::new(),
                };
            },
        };

        let limit = limit.unwrap_or(self.config.upcoming_limit).max(1);
        match self
            .bounded(self.calendar.list_events(&access, Utc::now(), limit))
            .await
        {
            Ok(events) => {
                debug!(count = events.len(), "Listed upcoming events");
                UpcomingEvents {
                    outcome: SyncOutcome::Synced,
                    events,
                }
            },
            Err(e) => {
                warn!(error = %e, "Listing upcoming events failed");
                UpcomingEvents {
                    outcome: SyncOutcome::failed(e),
                    events: Vec::new(),
                }
            },
        }
    }

    async fn delete_linked(&self, user_id: &UserId, task: &Task) -> SyncReport {
        if !self.status.is_configured() {
            return skipped(task, SyncOutcome::NotConfigured);
        }
        let SyncLink::Synced(event_id) = &task.sync_link else {
            debug!("Task has no remote event; nothing to delete");
            return SyncReport::unchanged(SyncLink::Unsynced, SyncOutcome::Synced);
        };
        let access = match self.access(user_id).await {
            Ok(access) => access,
            Err(outcome) => return skipped(task, outcome),
        };

        match self
            .bounded(self.calendar.delete_event(&access, event_id))
            .await
        {
            Ok(()) => {
                info!(event_id = %event_id, "Remote event deleted");
                SyncReport {
                    link: SyncLink::Unsynced,
                    outcome: SyncOutcome::Synced,
                    action: SyncAction::Deleted,
                }
            },
            Err(e) => provider_failed(task, &e),
        }
    }

    async fn create_remote(&self, access: &CalendarAccess, task: &Task) -> SyncReport {
        let descriptor = CalendarEventDescriptor::from_task(task);
        match self
            .bounded(self.calendar.insert_event(access, &descriptor))
            .await
        {
            Ok(event_id) => {
                info!(event_id = %event_id, "Remote event created");
                SyncReport {
                    link: SyncLink::Synced(event_id),
                    outcome: SyncOutcome::Synced,
                    action: SyncAction::Created,
                }
            },
            Err(e) => provider_failed(task, &e),
        }
    }

    async fn update_remote(
        &self,
        access: &CalendarAccess,
        task: &Task,
        event_id: &RemoteEventId,
    ) -> SyncReport {
        let descriptor = CalendarEventDescriptor::from_task(task);
        match self
            .bounded(self.calendar.update_event(access, event_id, &descriptor))
            .await
        {
            Ok(()) => {
                info!(event_id = %event_id, "Remote event updated");
                SyncReport {
                    link: task.sync_link.clone(),
                    outcome: SyncOutcome::Synced,
                    action: SyncAction::Updated,
                }
            },
            Err(e) => provider_failed(task, &e),
        }
    }

    async fn access(&self, user_id: &UserId) -> Result<CalendarAccess, SyncOutcome> {
        let credential = self.status.usable_credential(user_id).await?;
        Ok(CalendarAccess::new(
            credential.access_token,
            self.config.calendar_id.clone(),
        ))
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, ProviderError>>,
    ) -> Result<T, ProviderError> {
        match tokio::time::timeout(self.config.call_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout),
        }
    }
}

fn skipped(task: &Task, outcome: SyncOutcome) -> SyncReport {
    debug!(outcome = outcome.label(), "Calendar sync skipped");
    SyncReport::unchanged(task.sync_link.clone(), outcome)
}

fn provider_failed(task: &Task, error: &ProviderError) -> SyncReport {
    warn!(error = %error, transient = error.is_transient(), "Calendar sync failed");
    SyncReport::unchanged(task.sync_link.clone(), SyncOutcome::failed(error))
}
