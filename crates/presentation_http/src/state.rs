//! Shared application state

use std::{fmt, sync::Arc};

use application::{
    CalendarPort, CalendarSyncConfig, CalendarSyncEngine, ConnectionStatusQuery, CredentialStore,
    OAuthFlowManager, OAuthProviderPort, TaskStore, TokenRefresher,
};

/// Services shared by every handler
#[derive(Clone)]
pub struct AppState {
    /// OAuth connect / callback / disconnect
    pub oauth: Arc<OAuthFlowManager>,
    /// Connection status checks
    pub status: Arc<ConnectionStatusQuery>,
    /// Task-to-calendar synchronization
    pub sync: Arc<CalendarSyncEngine>,
    /// Task read model; handlers write back only the sync link
    pub tasks: Arc<dyn TaskStore>,
}

impl AppState {
    /// Build the service graph on top of the given adapters
    pub fn new(
        provider: Arc<dyn OAuthProviderPort>,
        calendar: Arc<dyn CalendarPort>,
        credentials: Arc<dyn CredentialStore>,
        tasks: Arc<dyn TaskStore>,
        sync_config: CalendarSyncConfig,
    ) -> Self {
        let refresher = Arc::new(TokenRefresher::new(
            Arc::clone(&credentials),
            Arc::clone(&provider),
        ));
        let status = Arc::new(ConnectionStatusQuery::new(Arc::clone(&provider), refresher));
        let oauth = Arc::new(OAuthFlowManager::new(
            provider,
            credentials,
            Arc::clone(&status),
        ));
        let sync = Arc::new(CalendarSyncEngine::new(
            Arc::clone(&status),
            calendar,
            sync_config,
        ));

        Self {
            oauth,
            status,
            sync,
            tasks,
        }
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("configured", &self.status.is_configured())
            .finish_non_exhaustive()
    }
}
