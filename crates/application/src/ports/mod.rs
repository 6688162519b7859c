//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these ports.

mod calendar_port;
mod credential_store;
mod oauth_provider_port;
mod task_store;

#[cfg(test)]
pub use calendar_port::MockCalendarPort;
pub use calendar_port::{CalendarAccess, CalendarPort};
#[cfg(test)]
pub use credential_store::MockCredentialStore;
pub use credential_store::CredentialStore;
#[cfg(test)]
pub use oauth_provider_port::MockOAuthProviderPort;
pub use oauth_provider_port::{OAuthProviderPort, TokenGrant};
#[cfg(test)]
pub use task_store::MockTaskStore;
pub use task_store::TaskStore;
