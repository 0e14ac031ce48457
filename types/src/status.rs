//! Canonical, provider-agnostic verification outcomes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized outcome derived from a provider-specific status string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CanonicalStatus {
    Approved,
    Declined,
    Pending(PendingKind),
}

/// Sub-kind of a non-terminal outcome.
///
/// Only "in review" has an effect beyond the audit trail (the profile is
/// flagged as pending); every other in-flight status folds into `Other`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PendingKind {
    InReview,
    Other,
}

impl CanonicalStatus {
    /// Approved and declined outcomes write a verification record.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Declined)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Declined => "declined",
            Self::Pending(PendingKind::InReview) => "in_review",
            Self::Pending(PendingKind::Other) => "pending",
        }
    }
}

impl fmt::Display for CanonicalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
