//! Identifier newtypes.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::IdvError;

/// Internal user identifier.
///
/// Sent to providers as the vendor-echo field at session creation and read
/// back from their webhooks; it is the only link from a callback to a user.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Create a user id, rejecting empty or whitespace-only input.
    pub fn new(raw: impl Into<String>) -> Result<Self, IdvError> {
        let s = raw.into();
        if s.trim().is_empty() {
            return Err(IdvError::EmptyIdentifier("user id"));
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Session identifier assigned by a provider. Unique per provider only.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProviderSessionId(String);

impl ProviderSessionId {
    pub fn new(raw: impl Into<String>) -> Result<Self, IdvError> {
        let s = raw.into();
        if s.trim().is_empty() {
            return Err(IdvError::EmptyIdentifier("provider session id"));
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderSessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Direct-message thread identifier, owned by the messaging service.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ThreadId(String);

impl ThreadId {
    pub fn new(raw: impl Into<String>) -> Result<Self, IdvError> {
        let s = raw.into();
        if s.trim().is_empty() {
            return Err(IdvError::EmptyIdentifier("thread id"));
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
