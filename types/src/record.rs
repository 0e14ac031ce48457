//! Verification records: a user's current standing per verification method.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{IdvError, Timestamp, UserId};

/// How a user was verified. Both providers perform document verification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VerificationMethod {
    IdDocument,
}

impl VerificationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IdDocument => "id_document",
        }
    }
}

impl fmt::Display for VerificationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VerificationMethod {
    type Err = IdvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id_document" => Ok(Self::IdDocument),
            _ => Err(IdvError::UnknownMethod(s.to_string())),
        }
    }
}

/// Status of a verification record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordStatus {
    Pending,
    Verified,
    Failed,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Verified => "verified",
            Self::Failed => "failed",
        }
    }
}

/// The durable, current verification standing for `(user_id, method)`.
///
/// At most one exists per pair. Later terminal webhooks overwrite it in
/// place; there is no history and no terminal lock.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRecord {
    pub user_id: UserId,
    pub method: VerificationMethod,
    pub status: RecordStatus,
    pub rejection_reason: Option<String>,
    pub reviewed_at: Option<Timestamp>,
    pub reviewer_notes: String,
}

impl VerificationRecord {
    /// A fresh record with no review yet.
    pub fn pending(user_id: UserId, method: VerificationMethod) -> Self {
        Self {
            user_id,
            method,
            status: RecordStatus::Pending,
            rejection_reason: None,
            reviewed_at: None,
            reviewer_notes: String::new(),
        }
    }
}
