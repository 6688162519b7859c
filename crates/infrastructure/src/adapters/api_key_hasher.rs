//! Argon2id hashing for configured API keys
//!
//! ```
//! use infrastructure::adapters::ApiKeyHasher;
//!
//! let hasher = ApiKeyHasher::new();
//! let phc = hasher.hash("sk-my-secret-key").unwrap();
//!
//! assert!(hasher.verify("sk-my-secret-key", &phc).unwrap());
//! assert!(!hasher.verify("wrong-key", &phc).unwrap());
//! ```

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{self, SaltString, rand_core::OsRng},
};
use thiserror::Error;
use tracing::instrument;

/// Prefix shared by every Argon2 PHC string
const PHC_PREFIX: &str = "$argon2";

#[derive(Debug, Error)]
pub enum ApiKeyHashError {
    #[error("Failed to hash API key: {0}")]
    HashingFailed(password_hash::Error),

    /// The configured value is not a PHC string
    #[error("Invalid hash format: {0}")]
    InvalidHashFormat(password_hash::Error),
}

/// Hashes and checks API keys with Argon2id default parameters
#[derive(Debug, Clone, Default)]
pub struct ApiKeyHasher {
    argon2: Argon2<'static>,
}

impl ApiKeyHasher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce a salted PHC string suitable for `security.api_keys`
    #[instrument(skip_all)]
    pub fn hash(&self, api_key: &str) -> Result<String, ApiKeyHashError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(api_key.as_bytes(), &salt)
            .map(|phc| phc.to_string())
            .map_err(ApiKeyHashError::HashingFailed)
    }

    /// `Ok(false)` on mismatch; `Err` only when `phc` cannot be parsed
    #[instrument(skip_all)]
    pub fn verify(&self, api_key: &str, phc: &str) -> Result<bool, ApiKeyHashError> {
        let parsed = PasswordHash::new(phc).map_err(ApiKeyHashError::InvalidHashFormat)?;
        Ok(self
            .argon2
            .verify_password(api_key.as_bytes(), &parsed)
            .is_ok())
    }

    /// Cheap syntactic check used to flag plaintext keys in config
    ///
    /// ```
    /// use infrastructure::adapters::ApiKeyHasher;
    ///
    /// assert!(ApiKeyHasher::is_hashed("$argon2id$v=19$m=19456,t=2,p=1$..."));
    /// assert!(!ApiKeyHasher::is_hashed("sk-plaintext-key"));
    /// ```
    #[must_use]
    pub fn is_hashed(value: &str) -> bool {
        value.starts_with(PHC_PREFIX)
    }
}
