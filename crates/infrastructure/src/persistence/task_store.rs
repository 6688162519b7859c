//! SQLite task store implementation
//!
//! Implements the `TaskStore` port using SQLite. The remote calendar link is
//! the nullable `calendar_event_id` column.

use std::sync::Arc;

use application::{StorageError, ports::TaskStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{RemoteEventId, SyncLink, Task, TaskId, TaskStatus, UserId};
use rusqlite::{OptionalExtension, Row, params};
use tokio::task;
use tracing::{debug, instrument};

use super::{
    connection::ConnectionPool,
    error::{DatabaseError, conversion_error},
};

/// SQLite-based task store
#[derive(Debug, Clone)]
pub struct SqliteTaskStore {
    pool: Arc<ConnectionPool>,
}

impl SqliteTaskStore {
    /// Create a new SQLite task store
    #[must_use]
    pub const fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }
}

/// Convert a database row to a `Task`
fn row_to_task(row: &Row<'_>) -> Result<Task, rusqlite::Error> {
    let id_str: String = row.get(0)?;
    let owner_str: Option<String> = row.get(1)?;
    let name: String = row.get(2)?;
    let description: Option<String> = row.get(3)?;
    let deadline_str: String = row.get(4)?;
    let status_str: String = row.get(5)?;
    let category: Option<String> = row.get(6)?;
    let assignee: Option<String> = row.get(7)?;
    let event_id: Option<String> = row.get(8)?;

    let id = TaskId::parse(&id_str).map_err(|e| conversion_error(0, e))?;
    let owner = owner_str
        .as_deref()
        .map(UserId::parse)
        .transpose()
        .map_err(|e| conversion_error(1, e))?;
    let deadline = DateTime::parse_from_rfc3339(&deadline_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(4, e))?;
    let status: TaskStatus = status_str.parse().map_err(|e| conversion_error(5, e))?;
    let remote_id = event_id
        .map(RemoteEventId::new)
        .transpose()
        .map_err(|e| conversion_error(8, e))?;

    Ok(Task {
        id,
        owner,
        name,
        description,
        deadline,
        status,
        category,
        assignee,
        sync_link: SyncLink::from_remote_id(remote_id),
    })
}

fn link_column(link: &SyncLink) -> Option<String> {
    link.remote_event_id().map(|id| id.as_str().to_string())
}

#[async_trait]
impl TaskStore for SqliteTaskStore {
    #[instrument(skip(self), fields(task_id = %task_id))]
    async fn get(&self, task_id: &TaskId) -> Result<Option<Task>, StorageError> {
        let pool = Arc::clone(&self.pool);
        let id_str = task_id.to_string();

        let result = task::spawn_blocking(move || -> Result<_, DatabaseError> {
            let conn = pool.get()?;

            let task = conn
                .query_row(
                    "SELECT id, owner_id, name, description, deadline, status,
                            category, assignee, calendar_event_id
                     FROM tasks WHERE id = ?1",
                    [&id_str],
                    row_to_task,
                )
                .optional()?;

            debug!(found = task.is_some(), "Retrieved task");
            Ok(task)
        })
        .await
        .map_err(DatabaseError::from)?;

        Ok(result?)
    }

    #[instrument(skip(self, task), fields(task_id = %task.id))]
    async fn save(&self, task: &Task) -> Result<(), StorageError> {
        let pool = Arc::clone(&self.pool);
        let task = task.clone();
        let now = Utc::now().to_rfc3339();

        let result = task::spawn_blocking(move || -> Result<_, DatabaseError> {
            let conn = pool.get()?;

            conn.execute(
                "INSERT INTO tasks
                     (id, owner_id, name, description, deadline, status, category,
                      assignee, calendar_event_id, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)
                 ON CONFLICT(id) DO UPDATE SET
                     owner_id = excluded.owner_id,
                     name = excluded.name,
                     description = excluded.description,
                     deadline = excluded.deadline,
                     status = excluded.status,
                     category = excluded.category,
                     assignee = excluded.assignee,
                     calendar_event_id = excluded.calendar_event_id,
                     updated_at = excluded.updated_at",
                params![
                    task.id.to_string(),
                    task.owner.map(|owner| owner.to_string()),
                    task.name,
                    task.description,
                    task.deadline.to_rfc3339(),
                    task.status.as_str(),
                    task.category,
                    task.assignee,
                    link_column(&task.sync_link),
                    now,
                ],
            )?;

            debug!("Saved task");
            Ok(())
        })
        .await
        .map_err(DatabaseError::from)?;

        Ok(result?)
    }

    #[instrument(skip(self, link), fields(task_id = %task_id, link = link.label()))]
    async fn set_sync_link(
        &self,
        task_id: &TaskId,
        link: &SyncLink,
    ) -> Result<bool, StorageError> {
        let pool = Arc::clone(&self.pool);
        let id_str = task_id.to_string();
        let event_id = link_column(link);
        let now = Utc::now().to_rfc3339();

        let result = task::spawn_blocking(move || -> Result<_, DatabaseError> {
            let conn = pool.get()?;

            let updated = conn.execute(
                "UPDATE tasks SET calendar_event_id = ?1, updated_at = ?2 WHERE id = ?3",
                params![event_id, now, id_str],
            )?;

            debug!(updated = updated > 0, "Updated task sync link");
            Ok(updated > 0)
        })
        .await
        .map_err(DatabaseError::from)?;

        Ok(result?)
    }
}
