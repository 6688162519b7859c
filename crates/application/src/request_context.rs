//! Authenticated caller context
//!
//! The HTTP middleware builds a `RequestContext` after API key
//! authentication. Handlers read the `UserId` from it and pass that id
//! explicitly into every credential and sync operation.
//!
//! ```
//! use application::RequestContext;
//! use domain::UserId;
//!
//! let user_id = UserId::new();
//! let ctx = RequestContext::new(user_id);
//! assert_eq!(ctx.user_id(), user_id);
//! ```

use domain::UserId;
use uuid::Uuid;

/// Identity and correlation data for one request
#[derive(Debug, Clone)]
pub struct RequestContext {
    user_id: UserId,
    request_id: Uuid,
}

impl RequestContext {
    /// Context for `user_id` with a fresh request id
    #[must_use]
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            request_id: Uuid::new_v4(),
        }
    }

    /// Reuse a request id supplied upstream (e.g. `X-Request-Id`)
    #[must_use]
    pub fn with_request_id(user_id: UserId, request_id: Uuid) -> Self {
        Self {
            request_id,
            ..Self::new(user_id)
        }
    }

    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub const fn request_id(&self) -> Uuid {
        self.request_id
    }
}
