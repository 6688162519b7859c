//! Integration tests for HTTP handlers
#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use application::{
    CalendarAccess, CalendarPort, CalendarSyncConfig, CredentialStore, OAuthProviderPort,
    ProviderError, TaskStore, TokenGrant,
};
use async_trait::async_trait;
use axum::http::{HeaderValue, StatusCode, header::AUTHORIZATION};
use axum_test::TestServer;
use chrono::{DateTime, Duration, Utc};
use domain::{
    CalendarEvent, CalendarEventDescriptor, Credential, RemoteEventId, SyncLink, Task, UserId,
};
use infrastructure::{
    ApiKeyEntry, ApiKeyHasher, DatabaseConfig, SqliteCredentialStore, SqliteTaskStore,
    create_pool,
};
use presentation_http::{ApiKeyAuthLayer, AppState, LOCAL_USER_ID, create_router};
use serde_json::{Value, json};

const AUTH_URL: &str = "https://accounts.example.test/auth?client_id=client";

/// OAuth provider that accepts every code except `bad-code`
struct FakeProvider {
    configured: bool,
}

fn grant(access_token: &str) -> TokenGrant {
    TokenGrant {
        access_token: access_token.to_string(),
        refresh_token: Some("refresh-1".to_string()),
        expires_in: Some(3600),
        scope: None,
        token_type: Some("Bearer".to_string()),
    }
}

#[async_trait]
impl OAuthProviderPort for FakeProvider {
    fn is_configured(&self) -> bool {
        self.configured
    }

    fn authorization_url(&self) -> Result<String, ProviderError> {
        Ok(AUTH_URL.to_string())
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenGrant, ProviderError> {
        if code == "bad-code" {
            return Err(ProviderError::Rejected {
                error: "invalid_grant".to_string(),
                description: None,
            });
        }
        Ok(grant("access-from-code"))
    }

    async fn refresh(&self, _refresh_token: &str) -> Result<TokenGrant, ProviderError> {
        Ok(grant("access-from-refresh"))
    }
}

/// Calendar that hands out sequential event ids and counts calls
#[derive(Default)]
struct FakeCalendar {
    inserts: AtomicUsize,
    updates: AtomicUsize,
    deletes: AtomicUsize,
}

#[async_trait]
impl CalendarPort for FakeCalendar {
    async fn insert_event(
        &self,
        _access: &CalendarAccess,
        _event: &CalendarEventDescriptor,
    ) -> Result<RemoteEventId, ProviderError> {
        let n = self.inserts.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(RemoteEventId::new(format!("evt-{n}")).unwrap())
    }

    async fn update_event(
        &self,
        _access: &CalendarAccess,
        _event_id: &RemoteEventId,
        _event: &CalendarEventDescriptor,
    ) -> Result<(), ProviderError> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn delete_event(
        &self,
        _access: &CalendarAccess,
        _event_id: &RemoteEventId,
    ) -> Result<(), ProviderError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn list_events(
        &self,
        _access: &CalendarAccess,
        _from: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<CalendarEvent>, ProviderError> {
        Ok((1..=limit.min(2))
            .map(|i| CalendarEvent {
                id: format!("evt-{i}"),
                summary: format!("Event {i}"),
                start: Some("2030-01-01T09:00:00Z".to_string()),
                end: Some("2030-01-01T10:00:00Z".to_string()),
            })
            .collect())
    }
}

struct Harness {
    server: TestServer,
    calendar: Arc<FakeCalendar>,
    credentials: Arc<SqliteCredentialStore>,
    tasks: Arc<SqliteTaskStore>,
}

impl Harness {
    fn new(configured: bool) -> Self {
        Self::with_auth(configured, ApiKeyAuthLayer::disabled())
    }

    fn with_auth(configured: bool, auth: ApiKeyAuthLayer) -> Self {
        let pool = Arc::new(
            create_pool(&DatabaseConfig {
                path: ":memory:".to_string(),
                max_connections: 1,
                ..DatabaseConfig::default()
            })
            .expect("in-memory pool"),
        );
        let calendar = Arc::new(FakeCalendar::default());
        let credentials = Arc::new(SqliteCredentialStore::new(Arc::clone(&pool)));
        let tasks = Arc::new(SqliteTaskStore::new(pool));

        let state = AppState::new(
            Arc::new(FakeProvider { configured }),
            Arc::clone(&calendar) as Arc<dyn CalendarPort>,
            Arc::clone(&credentials) as Arc<dyn CredentialStore>,
            Arc::clone(&tasks) as Arc<dyn TaskStore>,
            CalendarSyncConfig::default(),
        );
        let server =
            TestServer::new(create_router(state).layer(auth)).expect("Failed to create test server");

        Self {
            server,
            calendar,
            credentials,
            tasks,
        }
    }

    async fn connect(&self, user_id: UserId) {
        self.credentials
            .save(
                &user_id,
                &Credential::new("access")
                    .with_refresh_token("refresh")
                    .with_expires_at(Utc::now() + Duration::hours(1)),
            )
            .await
            .unwrap();
    }

    async fn task_for(&self, owner: UserId) -> Task {
        let task = Task::new("Quarterly report", Utc::now() + Duration::days(3))
            .with_owner(owner)
            .with_description("Numbers for Q3");
        self.tasks.save(&task).await.unwrap();
        task
    }

    async fn stored_link(&self, task: &Task) -> SyncLink {
        self.tasks.get(&task.id).await.unwrap().unwrap().sync_link
    }
}

#[tokio::test]
async fn health_endpoint_returns_ok() {
    let h = Harness::new(false);
    let response = h.server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn status_reports_configuration_and_connection() {
    let h = Harness::new(true);

    let body: Value = h.server.get("/v1/calendar/status").await.json();
    assert_eq!(body, json!({"connected": false, "configured": true}));

    h.connect(LOCAL_USER_ID).await;
    let body: Value = h.server.get("/v1/calendar/status").await.json();
    assert_eq!(body, json!({"connected": true, "configured": true}));
}

#[tokio::test]
async fn connect_when_unconfigured_explains() {
    let h = Harness::new(false);
    let response = h.server.get("/v1/calendar/connect").await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Google Calendar is not configured.");
}

#[tokio::test]
async fn connect_redirects_to_consent_page() {
    let h = Harness::new(true);
    let response = h.server.get("/v1/calendar/connect").await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), AUTH_URL);
}

#[tokio::test]
async fn connect_when_already_connected_short_circuits() {
    let h = Harness::new(true);
    h.connect(LOCAL_USER_ID).await;

    let response = h.server.get("/v1/calendar/connect").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "Already connected!");
}

#[tokio::test]
async fn callback_exchanges_code_and_persists() {
    let h = Harness::new(true);

    let response = h.server.get("/v1/calendar/callback?code=good-code").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(
        body,
        json!({"success": true, "message": "Google Calendar connected!"})
    );

    let stored = h.credentials.load(&LOCAL_USER_ID).await.unwrap().unwrap();
    assert_eq!(stored.access_token, "access-from-code");
    assert_eq!(stored.refresh_token.as_deref(), Some("refresh-1"));
}

#[tokio::test]
async fn callback_with_denial_or_no_code_fails() {
    let h = Harness::new(true);

    let response = h.server.get("/v1/calendar/callback?error=access_denied").await;
    response.assert_status_bad_request();
    assert_eq!(response.json::<Value>()["message"], "Access denied.");

    let response = h.server.get("/v1/calendar/callback").await;
    response.assert_status_bad_request();
    assert_eq!(response.json::<Value>()["message"], "No code returned.");

    assert!(h.credentials.load(&LOCAL_USER_ID).await.unwrap().is_none());
}

#[tokio::test]
async fn callback_with_rejected_code_stores_nothing() {
    let h = Harness::new(true);

    let response = h.server.get("/v1/calendar/callback?code=bad-code").await;
    response.assert_status(StatusCode::BAD_GATEWAY);
    assert_eq!(response.json::<Value>()["success"], false);
    assert!(h.credentials.load(&LOCAL_USER_ID).await.unwrap().is_none());
}

#[tokio::test]
async fn disconnect_clears_credential_and_is_idempotent() {
    let h = Harness::new(true);
    h.connect(LOCAL_USER_ID).await;

    for _ in 0..2 {
        let response = h.server.post("/v1/calendar/disconnect").await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["message"], "Disconnected successfully!");
    }

    assert!(h.credentials.load(&LOCAL_USER_ID).await.unwrap().is_none());
}

#[tokio::test]
async fn lifecycle_created_links_task() {
    let h = Harness::new(true);
    h.connect(LOCAL_USER_ID).await;
    let task = h.task_for(LOCAL_USER_ID).await;

    let response = h
        .server
        .post(&format!("/v1/tasks/{}/calendar/lifecycle", task.id))
        .json(&json!({"mutation": "created"}))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["outcome"]["status"], "synced");
    assert_eq!(body["remote_event_id"], "evt-1");
    assert_eq!(
        body["message"],
        "Task added and synced with Google Calendar successfully!"
    );
    assert_eq!(
        h.stored_link(&task).await.remote_event_id().map(RemoteEventId::as_str),
        Some("evt-1")
    );
}

#[tokio::test]
async fn lifecycle_when_disconnected_prompts_to_connect() {
    let h = Harness::new(true);
    let task = h.task_for(LOCAL_USER_ID).await;

    let response = h
        .server
        .post(&format!("/v1/tasks/{}/calendar/lifecycle", task.id))
        .json(&json!({"mutation": "created"}))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["outcome"]["status"], "not_connected");
    assert!(body["remote_event_id"].is_null());
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .contains("Connect to Google Calendar")
    );
    assert_eq!(h.calendar.inserts.load(Ordering::SeqCst), 0);
    assert_eq!(h.stored_link(&task).await, SyncLink::Unsynced);
}

#[tokio::test]
async fn connecting_after_disconnected_create_lets_manual_sync_link_task() {
    let h = Harness::new(true);
    let task = h.task_for(LOCAL_USER_ID).await;

    let body: Value = h
        .server
        .post(&format!("/v1/tasks/{}/calendar/lifecycle", task.id))
        .json(&json!({"mutation": "created"}))
        .await
        .json();
    assert_eq!(body["outcome"]["status"], "not_connected");
    assert_eq!(h.stored_link(&task).await, SyncLink::Unsynced);

    h.connect(LOCAL_USER_ID).await;

    let response = h
        .server
        .post(&format!("/v1/tasks/{}/calendar/sync", task.id))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(
        body["message"],
        "Task successfully synced with Google Calendar! Event created."
    );
    assert_eq!(body["remote_event_id"], "evt-1");
    assert_eq!(h.calendar.inserts.load(Ordering::SeqCst), 1);
    assert_eq!(
        h.stored_link(&task).await,
        SyncLink::Synced(RemoteEventId::new("evt-1").unwrap())
    );
}

#[tokio::test]
async fn lifecycle_when_unconfigured_leaves_link() {
    let h = Harness::new(false);
    h.connect(LOCAL_USER_ID).await;
    let task = h.task_for(LOCAL_USER_ID).await;

    let body: Value = h
        .server
        .post(&format!("/v1/tasks/{}/calendar/lifecycle", task.id))
        .json(&json!({"mutation": "updated"}))
        .await
        .json();

    assert_eq!(body["outcome"]["status"], "not_configured");
    assert_eq!(h.calendar.inserts.load(Ordering::SeqCst), 0);
    assert_eq!(h.stored_link(&task).await, SyncLink::Unsynced);
}

#[tokio::test]
async fn lifecycle_deleted_removes_event_without_writing_link() {
    let h = Harness::new(true);
    h.connect(LOCAL_USER_ID).await;
    let task = h.task_for(LOCAL_USER_ID).await;
    h.tasks
        .set_sync_link(&task.id, &SyncLink::Synced(RemoteEventId::new("evt-9").unwrap()))
        .await
        .unwrap();

    let body: Value = h
        .server
        .post(&format!("/v1/tasks/{}/calendar/lifecycle", task.id))
        .json(&json!({"mutation": "deleted"}))
        .await
        .json();

    assert_eq!(body["outcome"]["status"], "synced");
    assert_eq!(
        body["message"],
        "Task and Google Calendar event deleted successfully!"
    );
    assert_eq!(h.calendar.deletes.load(Ordering::SeqCst), 1);
    // The task application deletes the row itself
    assert!(h.stored_link(&task).await.is_synced());
}

#[tokio::test]
async fn manual_sync_then_remove_link() {
    let h = Harness::new(true);
    h.connect(LOCAL_USER_ID).await;
    let task = h.task_for(LOCAL_USER_ID).await;
    let sync_path = format!("/v1/tasks/{}/calendar/sync", task.id);

    let body: Value = h.server.post(&sync_path).await.json();
    assert_eq!(
        body["message"],
        "Task successfully synced with Google Calendar! Event created."
    );

    let body: Value = h.server.post(&sync_path).await.json();
    assert_eq!(
        body["message"],
        "Task successfully synced with Google Calendar! Event updated."
    );
    assert_eq!(body["remote_event_id"], "evt-1");
    assert_eq!(h.calendar.updates.load(Ordering::SeqCst), 1);

    let response = h
        .server
        .delete(&format!("/v1/tasks/{}/calendar", task.id))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "Task removed from Google Calendar successfully!");
    assert!(body["remote_event_id"].is_null());
    assert_eq!(h.stored_link(&task).await, SyncLink::Unsynced);
}

#[tokio::test]
async fn task_routes_hide_missing_and_foreign_tasks() {
    let h = Harness::new(true);
    h.connect(LOCAL_USER_ID).await;
    let foreign = h.task_for(UserId::new()).await;

    h.server
        .post(&format!("/v1/tasks/{}/calendar/sync", foreign.id))
        .await
        .assert_status_not_found();
    h.server
        .post(&format!("/v1/tasks/{}/calendar/sync", domain::TaskId::new()))
        .await
        .assert_status_not_found();
    h.server
        .post("/v1/tasks/not-a-uuid/calendar/sync")
        .await
        .assert_status_bad_request();

    assert_eq!(h.calendar.inserts.load(Ordering::SeqCst), 0);
    assert_eq!(h.stored_link(&foreign).await, SyncLink::Unsynced);
}

#[tokio::test]
async fn upcoming_events_respects_limit_and_connection() {
    let h = Harness::new(true);

    let body: Value = h.server.get("/v1/calendar/events").await.json();
    assert_eq!(body["outcome"]["status"], "not_connected");
    assert_eq!(body["events"], json!([]));

    h.connect(LOCAL_USER_ID).await;
    let body: Value = h.server.get("/v1/calendar/events?limit=1").await.json();
    assert_eq!(body["outcome"]["status"], "synced");
    assert_eq!(body["events"].as_array().unwrap().len(), 1);
    assert_eq!(body["events"][0]["summary"], "Event 1");
}

#[tokio::test]
async fn api_keys_scope_requests_to_their_user() {
    let user_id = UserId::new();
    let auth = ApiKeyAuthLayer::from_api_keys(vec![ApiKeyEntry {
        hash: ApiKeyHasher::new().hash("sk-test").unwrap(),
        user_id: user_id.to_string(),
    }]);
    let h = Harness::with_auth(true, auth);
    h.connect(user_id).await;

    h.server
        .get("/v1/calendar/status")
        .await
        .assert_status_unauthorized();
    h.server.get("/health").await.assert_status_ok();

    let body: Value = h
        .server
        .get("/v1/calendar/status")
        .add_header(AUTHORIZATION, HeaderValue::from_static("Bearer sk-test"))
        .await
        .json();
    assert_eq!(body["connected"], true);

    // The local single-user identity has nothing stored
    assert!(h.credentials.load(&LOCAL_USER_ID).await.unwrap().is_none());
}
