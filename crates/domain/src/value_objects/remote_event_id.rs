//! Identifier assigned to an event by the calendar provider

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Opaque event identifier issued by the remote calendar
///
/// Never empty. The provider owns the format, so no further validation is done.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RemoteEventId(String);

impl RemoteEventId {
    /// Wrap a provider-issued identifier
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidRemoteEventId` for blank input.
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DomainError::InvalidRemoteEventId(id));
        }
        Ok(Self(id))
    }

    /// Borrow the raw identifier
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RemoteEventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for RemoteEventId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RemoteEventId> for String {
    fn from(id: RemoteEventId) -> Self {
        id.0
    }
}
