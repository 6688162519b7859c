//! Calendar event payloads derived from tasks, and events read back

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::task::Task;

/// Fixed length of a task's calendar event
pub const EVENT_DURATION_MINUTES: i64 = 60;

const DEFAULT_TITLE: &str = "No Title";
const NO_DESCRIPTION: &str = "No description";
const NO_CATEGORY: &str = "Uncategorized";
const NO_ASSIGNEE: &str = "Unassigned";

/// Event payload sent to the provider
///
/// Derived fresh from the task on every sync call and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEventDescriptor {
    pub title: String,
    pub description: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl CalendarEventDescriptor {
    /// Build the descriptor for a task
    ///
    /// Missing description, category and assignee resolve to display
    /// placeholders here, not on the task.
    #[must_use]
    pub fn from_task(task: &Task) -> Self {
        let title = if task.name.trim().is_empty() {
            DEFAULT_TITLE.to_string()
        } else {
            task.name.clone()
        };

        let description = format!(
            "Task: {}\nDescription: {}\nStatus: {}\nCategory: {}\nAssigned to: {}",
            task.name,
            non_blank(task.description.as_deref()).unwrap_or(NO_DESCRIPTION),
            task.status.label(),
            non_blank(task.category.as_deref()).unwrap_or(NO_CATEGORY),
            non_blank(task.assignee.as_deref()).unwrap_or(NO_ASSIGNEE),
        );

        Self {
            title,
            description,
            start: task.deadline,
            end: task
                .deadline
                .checked_add_signed(Duration::minutes(EVENT_DURATION_MINUTES))
                .unwrap_or(task.deadline),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// An event read back from the remote calendar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Provider event identifier
    pub id: String,
    /// Event title
    pub summary: String,
    /// RFC 3339 date-time, or a plain date for all-day events
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}
