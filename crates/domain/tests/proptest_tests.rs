//! Property-based tests for domain value objects and entities
//!
//! These tests use proptest to verify invariants across many random inputs.

use chrono::{DateTime, Duration, Utc};
use domain::{CalendarEventDescriptor, Credential, RemoteEventId, SyncLink, Task, TaskStatus};
use proptest::prelude::*;

fn token() -> impl Strategy<Value = String> {
    "[A-Za-z0-9._-]{1,64}"
}

fn timestamp() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..4_000_000_000).prop_map(|secs| DateTime::from_timestamp(secs, 0).unwrap_or_default())
}

// ============================================================================
// Credential Property Tests
// ============================================================================

mod credential_tests {
    use super::*;

    proptest! {
        #[test]
        fn renewal_without_refresh_token_keeps_original(
            old_access in token(),
            refresh in token(),
            new_access in token(),
        ) {
            let previous = Credential::new(old_access).with_refresh_token(refresh.clone());
            let renewed = Credential::new(new_access.clone())
                .carry_forward_refresh_token(Some(&previous));

            prop_assert_eq!(renewed.refresh_token, Some(refresh));
            prop_assert_eq!(renewed.access_token, new_access);
        }

        #[test]
        fn renewal_with_refresh_token_replaces_original(
            refresh in token(),
            new_refresh in token(),
        ) {
            let previous = Credential::new("a").with_refresh_token(refresh);
            let renewed = Credential::new("b")
                .with_refresh_token(new_refresh.clone())
                .carry_forward_refresh_token(Some(&previous));

            prop_assert_eq!(renewed.refresh_token, Some(new_refresh));
        }

        #[test]
        fn expiry_is_monotonic(
            expires_at in timestamp(),
            earlier in 0i64..1_000_000,
            later in 0i64..1_000_000,
        ) {
            let cred = Credential::new("a").with_expires_at(expires_at);
            let t1 = expires_at - Duration::seconds(earlier);
            let t2 = t1 + Duration::seconds(later);
            if cred.is_expired_at(t1) {
                prop_assert!(cred.is_expired_at(t2));
            }
        }

        #[test]
        fn refresh_token_means_not_disconnected(access in "[a-z]{0,8}", refresh in token()) {
            let cred = Credential::new(access).with_refresh_token(refresh);
            prop_assert!(!cred.is_disconnected());
        }
    }
}

// ============================================================================
// Descriptor Property Tests
// ============================================================================

mod descriptor_tests {
    use super::*;

    fn status() -> impl Strategy<Value = TaskStatus> {
        prop_oneof![
            Just(TaskStatus::Pending),
            Just(TaskStatus::InProgress),
            Just(TaskStatus::Completed),
        ]
    }

    proptest! {
        #[test]
        fn event_always_spans_one_hour(deadline in timestamp(), name in "[a-zA-Z ]{0,30}") {
            let desc = CalendarEventDescriptor::from_task(&Task::new(name, deadline));
            prop_assert_eq!(desc.start, deadline);
            prop_assert_eq!(desc.end - desc.start, Duration::hours(1));
        }

        #[test]
        fn description_has_five_lines(
            name in "[a-zA-Z ]{1,30}",
            category in proptest::option::of("[a-zA-Z]{0,10}"),
            assignee in proptest::option::of("[a-zA-Z]{0,10}"),
            status in status(),
        ) {
            let mut task = Task::new(name, Utc::now()).with_status(status);
            task.category = category;
            task.assignee = assignee;

            let desc = CalendarEventDescriptor::from_task(&task);
            prop_assert_eq!(desc.description.lines().count(), 5);
            let status_line = format!("Status: {}", status.label());
            prop_assert!(desc.description.contains(&status_line));
        }
    }
}

// ============================================================================
// SyncLink Property Tests
// ============================================================================

mod sync_link_tests {
    use super::*;

    proptest! {
        #[test]
        fn link_preserves_remote_id(id in token()) {
            let remote = RemoteEventId::new(id.clone()).unwrap();
            let link = SyncLink::from_remote_id(Some(remote));
            prop_assert!(link.is_synced());
            prop_assert_eq!(link.remote_event_id().map(RemoteEventId::as_str), Some(id.as_str()));
        }

        #[test]
        fn blank_ids_are_rejected(spaces in " {0,5}") {
            prop_assert!(RemoteEventId::new(spaces).is_err());
        }
    }
}
