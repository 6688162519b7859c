//! SQLite storage settings.

use serde::{Deserialize, Serialize};

use super::default_true;

/// Where credentials and task links are stored
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// File path, or `:memory:` for a throwaway database
    #[serde(default = "DatabaseConfig::default_path")]
    pub path: String,

    /// Upper bound on pooled connections (ignored for `:memory:`)
    #[serde(default = "DatabaseConfig::default_pool_size")]
    pub max_connections: u32,

    /// How long a writer waits on a locked database, in milliseconds
    #[serde(default = "DatabaseConfig::default_busy_timeout")]
    pub busy_timeout_ms: u32,

    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

impl DatabaseConfig {
    fn default_path() -> String {
        String::from("tasksync.db")
    }

    const fn default_pool_size() -> u32 {
        5
    }

    const fn default_busy_timeout() -> u32 {
        5_000
    }

    /// Whether `path` selects a private in-memory database
    #[must_use]
    pub fn is_in_memory(&self) -> bool {
        self.path == crate::persistence::IN_MEMORY
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: Self::default_path(),
            max_connections: Self::default_pool_size(),
            busy_timeout_ms: Self::default_busy_timeout(),
            run_migrations: true,
        }
    }
}
