//! r2d2 pool over SQLite

use std::{fs, path::Path, time::Duration};

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use tracing::{debug, info};

use super::{error::DatabaseError, migrations};
use crate::config::DatabaseConfig;

pub type ConnectionPool = Pool<SqliteConnectionManager>;

/// Path that selects a private in-memory database
pub const IN_MEMORY: &str = ":memory:";

/// Build the pool, apply connection pragmas and (optionally) migrate.
///
/// Each in-memory connection would see a different database, so an
/// in-memory pool is capped at a single connection.
pub fn create_pool(config: &DatabaseConfig) -> Result<ConnectionPool, DatabaseError> {
    let busy_timeout = Duration::from_millis(u64::from(config.busy_timeout_ms));

    let (manager, max_size) = if config.is_in_memory() {
        (SqliteConnectionManager::memory(), 1)
    } else {
        ensure_parent_dir(Path::new(&config.path))?;
        let manager = SqliteConnectionManager::file(&config.path)
            .with_init(move |conn| apply_pragmas(conn, busy_timeout));
        (manager, config.max_connections.max(1))
    };

    info!(path = %config.path, max_size, "Opening SQLite pool");
    let pool = Pool::builder().max_size(max_size).build(manager)?;

    let conn = pool.get()?;
    apply_pragmas(&conn, busy_timeout)?;
    if config.run_migrations {
        migrations::run_migrations(&conn)?;
    } else {
        debug!("Skipping migrations");
    }
    drop(conn);

    Ok(pool)
}

fn ensure_parent_dir(db_path: &Path) -> Result<(), DatabaseError> {
    match db_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir).map_err(|e| {
            DatabaseError::Migration(format!("cannot create {}: {e}", dir.display()))
        }),
        _ => Ok(()),
    }
}

fn apply_pragmas(conn: &Connection, busy_timeout: Duration) -> Result<(), rusqlite::Error> {
    conn.busy_timeout(busy_timeout)?;
    conn.execute_batch(
        "PRAGMA foreign_keys = ON;
         PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;",
    )
}
