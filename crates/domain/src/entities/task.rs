//! Task read model consumed by calendar synchronization
//!
//! Task persistence belongs to the surrounding application. The sync code
//! only reads the fields below and writes the `sync_link`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{RemoteEventId, TaskId, TaskStatus, UserId};

/// Association between one task and at most one remote calendar event
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "remote_event_id", rename_all = "snake_case")]
pub enum SyncLink {
    /// No remote event exists for the task
    #[default]
    Unsynced,
    /// The task is mirrored by this remote event
    Synced(RemoteEventId),
}

impl SyncLink {
    /// Build a link from a nullable stored identifier
    #[must_use]
    pub fn from_remote_id(id: Option<RemoteEventId>) -> Self {
        id.map_or(Self::Unsynced, Self::Synced)
    }

    /// The remote identifier, if linked
    #[must_use]
    pub const fn remote_event_id(&self) -> Option<&RemoteEventId> {
        match self {
            Self::Unsynced => None,
            Self::Synced(id) => Some(id),
        }
    }

    #[must_use]
    pub const fn is_synced(&self) -> bool {
        matches!(self, Self::Synced(_))
    }

    /// Label used by the task listing (`synced` / `not_synced`)
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Unsynced => "not_synced",
            Self::Synced(_) => "synced",
        }
    }
}

/// A task as seen by the calendar sync engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier
    pub id: TaskId,
    /// User the task is assigned to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<UserId>,
    /// Task name, used as the event title
    pub name: String,
    /// Free-form description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Due date; the calendar event starts here
    pub deadline: DateTime<Utc>,
    /// Lifecycle status
    pub status: TaskStatus,
    /// Category display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Display name of the assigned user
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    /// Link to the remote calendar event
    #[serde(default)]
    pub sync_link: SyncLink,
}

impl Task {
    /// Create a new pending, unsynced task
    #[must_use]
    pub fn new(name: impl Into<String>, deadline: DateTime<Utc>) -> Self {
        Self {
            id: TaskId::new(),
            owner: None,
            name: name.into(),
            description: None,
            deadline,
            status: TaskStatus::Pending,
            category: None,
            assignee: None,
            sync_link: SyncLink::Unsynced,
        }
    }

    /// Set the owning user
    #[must_use]
    pub const fn with_owner(mut self, owner: UserId) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Set a description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the status
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the category display name
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the assignee display name
    #[must_use]
    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    /// Set the sync link
    #[must_use]
    pub fn with_sync_link(mut self, sync_link: SyncLink) -> Self {
        self.sync_link = sync_link;
        self
    }

    /// Deadline has passed and the task is not completed
    #[must_use]
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status.is_open() && self.deadline < now
    }

    /// Whether `user_id` may act on this task
    #[must_use]
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.owner == Some(user_id)
    }
}
