//! API key authentication middleware
//!
//! Validates Bearer tokens in the Authorization header against configured
//! API keys. Keys are stored as Argon2id hashes, and each one maps to the
//! user whose calendar connection the request acts on.
//!
//! With no keys configured the server runs in single-user mode: every
//! request is attributed to [`LOCAL_USER_ID`].

use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use application::RequestContext;
use axum::{
    extract::Request,
    http::header::AUTHORIZATION,
    response::{IntoResponse, Response},
};
use domain::UserId;
use infrastructure::{ApiKeyEntry, ApiKeyHasher};
use tower::{Layer, Service};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{error::ApiError, middleware::RequestId};

/// User that owns every request when authentication is disabled
pub const LOCAL_USER_ID: UserId = UserId::LOCAL;

/// Paths reachable without a key
const DEFAULT_EXCLUDED_PATHS: &[&str] = &["/health"];

#[derive(Clone, Debug)]
struct VerifiedKeyEntry {
    hash: String,
    user_id: UserId,
}

/// Storage for API key entries with hash verification
#[derive(Clone, Debug, Default)]
pub struct ApiKeyStore {
    entries: Vec<VerifiedKeyEntry>,
    hasher: ApiKeyHasher,
}

impl ApiKeyStore {
    /// Create from a list of API key entries
    ///
    /// Entries whose user id is not a UUID are logged and skipped.
    #[must_use]
    pub fn from_entries(entries: Vec<ApiKeyEntry>) -> Self {
        let entries = entries
            .into_iter()
            .filter_map(|entry| match UserId::parse(&entry.user_id) {
                Ok(user_id) => Some(VerifiedKeyEntry {
                    hash: entry.hash,
                    user_id,
                }),
                Err(e) => {
                    warn!(
                        user_id = %entry.user_id,
                        error = %e,
                        "Invalid user ID format in api_keys configuration, skipping entry"
                    );
                    None
                },
            })
            .collect();

        Self {
            entries,
            hasher: ApiKeyHasher::new(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Verify an API key and return the associated user ID if valid
    #[must_use]
    pub fn verify(&self, api_key: &str) -> Option<UserId> {
        for entry in &self.entries {
            match self.hasher.verify(api_key, &entry.hash) {
                Ok(true) => {
                    debug!(user_id = %entry.user_id, "API key verified");
                    return Some(entry.user_id);
                },
                Ok(false) => {},
                Err(e) => warn!(error = %e, "Error verifying API key hash"),
            }
        }
        None
    }
}

/// Layer that applies API key authentication
#[derive(Clone, Debug)]
pub struct ApiKeyAuthLayer {
    api_key_store: Arc<ApiKeyStore>,
    excluded_paths: Vec<String>,
}

impl ApiKeyAuthLayer {
    /// Single-user mode: every request passes as [`LOCAL_USER_ID`]
    #[must_use]
    pub fn disabled() -> Self {
        Self::from_api_keys(Vec::new())
    }

    /// Authenticate against the given hashed keys
    #[must_use]
    pub fn from_api_keys(entries: Vec<ApiKeyEntry>) -> Self {
        Self {
            api_key_store: Arc::new(ApiKeyStore::from_entries(entries)),
            excluded_paths: DEFAULT_EXCLUDED_PATHS
                .iter()
                .map(|p| (*p).to_string())
                .collect(),
        }
    }

    /// Add paths that should be excluded from authentication
    #[must_use]
    pub fn exclude_paths(mut self, paths: Vec<String>) -> Self {
        self.excluded_paths.extend(paths);
        self
    }
}

impl<S> Layer<S> for ApiKeyAuthLayer {
    type Service = ApiKeyAuth<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ApiKeyAuth {
            inner,
            api_key_store: Arc::clone(&self.api_key_store),
            excluded_paths: self.excluded_paths.clone(),
        }
    }
}

/// Middleware service for API key authentication
#[derive(Clone, Debug)]
pub struct ApiKeyAuth<S> {
    inner: S,
    api_key_store: Arc<ApiKeyStore>,
    excluded_paths: Vec<String>,
}

impl<S> Service<Request> for ApiKeyAuth<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        let api_key_store = Arc::clone(&self.api_key_store);
        let excluded_paths = self.excluded_paths.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let path = req.uri().path();
            if excluded_paths.iter().any(|p| path.starts_with(p.as_str())) {
                return inner.call(req).await;
            }

            if api_key_store.is_empty() {
                inject_request_context(&mut req, LOCAL_USER_ID);
                return inner.call(req).await;
            }

            let auth_header = req
                .headers()
                .get(AUTHORIZATION)
                .and_then(|v| v.to_str().ok());

            match auth_header.map(|h| h.strip_prefix("Bearer ")) {
                Some(Some(token)) => match api_key_store.verify(token) {
                    Some(user_id) => {
                        inject_request_context(&mut req, user_id);
                        inner.call(req).await
                    },
                    None => Ok(unauthorized_response("Invalid API key")),
                },
                Some(None) => Ok(unauthorized_response(
                    "Invalid authorization format, expected Bearer token",
                )),
                None => Ok(unauthorized_response("Missing Authorization header")),
            }
        })
    }
}

/// Attach the caller's `RequestContext`, reusing the id from `RequestIdLayer`
fn inject_request_context(req: &mut Request, user_id: UserId) {
    let request_id = req
        .extensions()
        .get::<RequestId>()
        .map_or_else(Uuid::new_v4, RequestId::as_uuid);

    req.extensions_mut()
        .insert(RequestContext::with_request_id(user_id, request_id));
}

fn unauthorized_response(message: &str) -> Response {
    ApiError::Unauthorized(message.to_string()).into_response()
}
