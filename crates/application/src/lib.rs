//! Application layer - Use cases and orchestration
//!
//! Contains the calendar synchronization services and the ports they
//! depend on. Orchestrates domain objects and infrastructure adapters.

pub mod error;
pub mod ports;
pub mod request_context;
pub mod services;

pub use error::{ConnectionError, OAuthError, ProviderError, StorageError};
pub use ports::*;
pub use request_context::RequestContext;
pub use services::*;
