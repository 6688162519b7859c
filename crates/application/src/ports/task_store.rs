//! Task storage port
//!
//! Tasks belong to the surrounding application. Sync code reads them and
//! writes back only the sync link.

use async_trait::async_trait;
use domain::{
    entities::{SyncLink, Task},
    value_objects::TaskId,
};
#[cfg(test)]
use mockall::automock;

use crate::error::StorageError;

/// Port for the task read model
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Get a task by ID
    async fn get(&self, task_id: &TaskId) -> Result<Option<Task>, StorageError>;

    /// Insert or replace a task
    async fn save(&self, task: &Task) -> Result<(), StorageError>;

    /// Write only the sync link
    ///
    /// Returns `false` if the task no longer exists.
    async fn set_sync_link(&self, task_id: &TaskId, link: &SyncLink)
    -> Result<bool, StorageError>;
}
