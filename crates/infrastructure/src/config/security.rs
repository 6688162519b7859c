//! API key settings.

use serde::{Deserialize, Serialize};

use crate::adapters::ApiKeyHasher;

/// One accepted key and the user it authenticates as
///
/// ```toml
/// [[security.api_keys]]
/// hash = "$argon2id$v=19$m=19456,t=2,p=1$..."
/// user_id = "550e8400-e29b-41d4-a716-446655440000"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeyEntry {
    /// Argon2id PHC string, never the raw key
    pub hash: String,
    pub user_id: String,
}

/// An empty key list switches the server to single-user mode
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(default)]
    pub api_keys: Vec<ApiKeyEntry>,
}

impl SecurityConfig {
    #[must_use]
    pub fn has_api_keys(&self) -> bool {
        !self.api_keys.is_empty()
    }

    /// Entries whose `hash` was left as a raw key
    #[must_use]
    pub fn count_plaintext_keys(&self) -> usize {
        self.api_keys
            .iter()
            .filter(|entry| !ApiKeyHasher::is_hashed(&entry.hash))
            .count()
    }
}
