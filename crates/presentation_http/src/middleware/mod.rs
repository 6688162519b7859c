//! HTTP middleware components

pub mod auth;
pub mod request_id;

pub use auth::{ApiKeyAuth, ApiKeyAuthLayer, ApiKeyStore, LOCAL_USER_ID};
pub use request_id::{REQUEST_ID_HEADER, RequestId, RequestIdLayer, RequestIdService};
