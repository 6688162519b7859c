//! Outcomes of calendar sync operations and their user-facing wording

use std::fmt;

use domain::entities::SyncLink;
use serde::{Deserialize, Serialize};

const PROVIDER: &str = "Google Calendar";

/// Result of one sync attempt
///
/// Never a fatal error: the task operation it accompanies has already
/// succeeded or failed on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// Remote calendar matches the task (or there was nothing to do)
    Synced,
    /// Provider credentials are missing from configuration
    NotConfigured,
    /// The user has no usable connection
    NotConnected,
    /// The provider call failed; the link was left as it was
    Failed { reason: String },
}

impl SyncOutcome {
    pub fn failed(reason: impl fmt::Display) -> Self {
        Self::Failed {
            reason: reason.to_string(),
        }
    }

    pub const fn is_synced(&self) -> bool {
        matches!(self, Self::Synced)
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Self::Synced => "synced",
            Self::NotConfigured => "not_configured",
            Self::NotConnected => "not_connected",
            Self::Failed { .. } => "failed",
        }
    }
}

/// Remote operation actually performed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncAction {
    Created,
    Updated,
    Deleted,
    None,
}

/// Which task event or user action started the sync
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncTrigger {
    Created,
    Updated,
    Deleted,
    ManualSync,
    RemoveLink,
}

/// New link state plus what happened
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub link: SyncLink,
    pub outcome: SyncOutcome,
    pub action: SyncAction,
}

impl SyncReport {
    /// Report leaving `link` untouched
    pub const fn unchanged(link: SyncLink, outcome: SyncOutcome) -> Self {
        Self {
            link,
            outcome,
            action: SyncAction::None,
        }
    }

    /// Advisory text appended to the result of the task operation
    pub fn advisory_message(&self, trigger: SyncTrigger) -> String {
        match trigger {
            SyncTrigger::Created => self.mutation_message("added"),
            SyncTrigger::Updated => {
                if self.outcome.is_synced() && self.action == SyncAction::Updated {
                    format!("Task updated and {PROVIDER} event synced successfully!")
                } else {
                    self.mutation_message("updated")
                }
            },
            SyncTrigger::Deleted => match (&self.outcome, self.action) {
                (SyncOutcome::Synced, SyncAction::Deleted) => {
                    format!("Task and {PROVIDER} event deleted successfully!")
                },
                (SyncOutcome::Failed { .. }, _) => {
                    format!("Task deleted successfully but failed to delete {PROVIDER} event.")
                },
                _ => "Task deleted successfully!".to_string(),
            },
            SyncTrigger::ManualSync => match &self.outcome {
                SyncOutcome::Synced => {
                    let verb = if self.action == SyncAction::Created {
                        "created"
                    } else {
                        "updated"
                    };
                    format!("Task successfully synced with {PROVIDER}! Event {verb}.")
                },
                SyncOutcome::Failed { .. } => format!("Failed to sync task with {PROVIDER}."),
                other => action_prompt(other),
            },
            SyncTrigger::RemoveLink => match (&self.outcome, self.action) {
                (SyncOutcome::Synced, SyncAction::Deleted) => {
                    format!("Task removed from {PROVIDER} successfully!")
                },
                (SyncOutcome::Synced, _) => format!("Task is not synced with {PROVIDER}."),
                (SyncOutcome::Failed { .. }, _) => {
                    format!("Failed to remove task from {PROVIDER}.")
                },
                (other, _) => action_prompt(other),
            },
        }
    }

    fn mutation_message(&self, verb: &str) -> String {
        match self.outcome {
            SyncOutcome::Synced => format!("Task {verb} and synced with {PROVIDER} successfully!"),
            SyncOutcome::Failed { .. } => {
                format!("Task {verb} successfully but failed to sync with {PROVIDER}.")
            },
            SyncOutcome::NotConnected => format!(
                "Task {verb} successfully! Connect to {PROVIDER} to enable automatic sync."
            ),
            SyncOutcome::NotConfigured => format!("Task {verb} successfully!"),
        }
    }
}

fn action_prompt(outcome: &SyncOutcome) -> String {
    match outcome {
        SyncOutcome::NotConfigured => {
            format!("{PROVIDER} is not configured. Please contact administrator.")
        },
        _ => format!("Please connect to {PROVIDER} first."),
    }
}

#[cfg(test)]
mod tests {
    use domain::value_objects::RemoteEventId;

    use super::*;

    fn linked() -> SyncLink {
        SyncLink::Synced(RemoteEventId::new("evt").unwrap())
    }

    fn report(outcome: SyncOutcome, action: SyncAction) -> SyncReport {
        SyncReport {
            link: linked(),
            outcome,
            action,
        }
    }

    #[test]
    fn create_messages() {
        assert_eq!(
            report(SyncOutcome::Synced, SyncAction::Created).advisory_message(SyncTrigger::Created),
            "Task added and synced with Google Calendar successfully!"
        );
        assert_eq!(
            report(SyncOutcome::failed("boom"), SyncAction::None)
                .advisory_message(SyncTrigger::Created),
            "Task added successfully but failed to sync with Google Calendar."
        );
        assert_eq!(
            report(SyncOutcome::NotConnected, SyncAction::None)
                .advisory_message(SyncTrigger::Created),
            "Task added successfully! Connect to Google Calendar to enable automatic sync."
        );
        assert_eq!(
            report(SyncOutcome::NotConfigured, SyncAction::None)
                .advisory_message(SyncTrigger::Created),
            "Task added successfully!"
        );
    }

    #[test]
    fn update_messages_distinguish_self_heal() {
        assert_eq!(
            report(SyncOutcome::Synced, SyncAction::Updated).advisory_message(SyncTrigger::Updated),
            "Task updated and Google Calendar event synced successfully!"
        );
        assert_eq!(
            report(SyncOutcome::Synced, SyncAction::Created).advisory_message(SyncTrigger::Updated),
            "Task updated and synced with Google Calendar successfully!"
        );
    }

    #[test]
    fn delete_messages() {
        assert_eq!(
            report(SyncOutcome::Synced, SyncAction::Deleted).advisory_message(SyncTrigger::Deleted),
            "Task and Google Calendar event deleted successfully!"
        );
        assert_eq!(
            report(SyncOutcome::Synced, SyncAction::None).advisory_message(SyncTrigger::Deleted),
            "Task deleted successfully!"
        );
        assert_eq!(
            report(SyncOutcome::failed("x"), SyncAction::None)
                .advisory_message(SyncTrigger::Deleted),
            "Task deleted successfully but failed to delete Google Calendar event."
        );
    }

    #[test]
    fn manual_sync_messages() {
        assert_eq!(
            report(SyncOutcome::Synced, SyncAction::Created)
                .advisory_message(SyncTrigger::ManualSync),
            "Task successfully synced with Google Calendar! Event created."
        );
        assert_eq!(
            report(SyncOutcome::Synced, SyncAction::Updated)
                .advisory_message(SyncTrigger::ManualSync),
            "Task successfully synced with Google Calendar! Event updated."
        );
        assert_eq!(
            report(SyncOutcome::NotConnected, SyncAction::None)
                .advisory_message(SyncTrigger::ManualSync),
            "Please connect to Google Calendar first."
        );
        assert_eq!(
            report(SyncOutcome::NotConfigured, SyncAction::None)
                .advisory_message(SyncTrigger::ManualSync),
            "Google Calendar is not configured. Please contact administrator."
        );
    }

    #[test]
    fn remove_link_messages() {
        assert_eq!(
            report(SyncOutcome::Synced, SyncAction::Deleted)
                .advisory_message(SyncTrigger::RemoveLink),
            "Task removed from Google Calendar successfully!"
        );
        assert_eq!(
            SyncReport::unchanged(SyncLink::Unsynced, SyncOutcome::Synced)
                .advisory_message(SyncTrigger::RemoveLink),
            "Task is not synced with Google Calendar."
        );
        assert_eq!(
            report(SyncOutcome::failed("x"), SyncAction::None)
                .advisory_message(SyncTrigger::RemoveLink),
            "Failed to remove task from Google Calendar."
        );
    }

    #[test]
    fn outcome_serialization() {
        let json = serde_json::to_string(&SyncOutcome::failed("timeout")).unwrap();
        assert_eq!(json, r#"{"status":"failed","reason":"timeout"}"#);
        let json = serde_json::to_string(&SyncOutcome::NotConnected).unwrap();
        assert_eq!(json, r#"{"status":"not_connected"}"#);
    }
}
