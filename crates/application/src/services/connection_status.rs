//! Connection status
//!
//! `is_connected` reports whether a usable token exists right now, so it
//! refreshes and persists an expired token when it can.

use std::{fmt, sync::Arc};

use domain::{entities::Credential, value_objects::UserId};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use super::{sync_report::SyncOutcome, token_refresher::TokenRefresher};
use crate::{error::ConnectionError, ports::OAuthProviderPort};

/// Payload of the status endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionStatus {
    pub connected: bool,
    pub configured: bool,
}

/// Answers "can this user sync right now?"
pub struct ConnectionStatusQuery {
    provider: Arc<dyn OAuthProviderPort>,
    refresher: Arc<TokenRefresher>,
}

impl fmt::Debug for ConnectionStatusQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionStatusQuery")
            .field("configured", &self.provider.is_configured())
            .finish_non_exhaustive()
    }
}

impl ConnectionStatusQuery {
    pub fn new(provider: Arc<dyn OAuthProviderPort>, refresher: Arc<TokenRefresher>) -> Self {
        Self {
            provider,
            refresher,
        }
    }

    /// Provider credentials are present in configuration
    pub fn is_configured(&self) -> bool {
        self.provider.is_configured()
    }

    /// A currently usable token exists, refreshing it if needed
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn is_connected(&self, user_id: &UserId) -> bool {
        match self.refresher.valid_credential(user_id).await {
            Ok(_) => true,
            Err(ConnectionError::NotConnected) => false,
            Err(ConnectionError::RefreshFailed(reason)) => {
                debug!(%reason, "Stored credential could not be refreshed");
                false
            },
            Err(ConnectionError::Storage(e)) => {
                warn!(error = %e, "Credential lookup failed");
                false
            },
        }
    }

    /// `{connected, configured}` for the status endpoint
    pub async fn status(&self, user_id: &UserId) -> ConnectionStatus {
        ConnectionStatus {
            configured: self.is_configured(),
            connected: self.is_connected(user_id).await,
        }
    }

    /// Credential for a sync call, or the outcome that short-circuits it
    pub(crate) async fn usable_credential(
        &self,
        user_id: &UserId,
    ) -> Result<Credential, SyncOutcome> {
        if !self.is_configured() {
            return Err(SyncOutcome::NotConfigured);
        }
        match self.refresher.valid_credential(user_id).await {
            Ok(credential) => Ok(credential),
            Err(ConnectionError::NotConnected | ConnectionError::RefreshFailed(_)) => {
                Err(SyncOutcome::NotConnected)
            },
            Err(ConnectionError::Storage(e)) => {
                warn!(error = %e, "Credential lookup failed");
                Err(SyncOutcome::failed(e))
            },
        }
    }
}
