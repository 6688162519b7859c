//! Domain layer for tasksync
//!
//! Contains the task read model, OAuth credentials and the calendar event
//! descriptor derived from a task. This layer has no I/O and defines the
//! ubiquitous language of calendar synchronization.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
