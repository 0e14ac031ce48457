//! User profile fields owned by the profile service and mutated here on
//! verification outcomes.

use serde::{Deserialize, Serialize};

use crate::{Timestamp, UserId, VerificationMethod};

/// The profile's human-verification flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HumanVerification {
    Unverified,
    Pending,
    Verified,
}

/// Account activation state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountStatus {
    Inactive,
    Active,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: UserId,
    pub verified_human: HumanVerification,
    pub verification_method: Option<VerificationMethod>,
    pub verified_at: Option<Timestamp>,
    pub account_status: AccountStatus,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

impl UserProfile {
    /// A newly registered, unverified and inactive profile.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            verified_human: HumanVerification::Unverified,
            verification_method: None,
            verified_at: None,
            account_status: AccountStatus::Inactive,
            display_name: None,
            username: None,
        }
    }

    /// Apply a partial change; `None` fields are left untouched.
    pub fn apply(&mut self, change: &ProfileChange) {
        if let Some(flag) = change.verified_human {
            self.verified_human = flag;
        }
        if let Some(method) = change.verification_method {
            self.verification_method = Some(method);
        }
        if let Some(at) = change.verified_at {
            self.verified_at = Some(at);
        }
        if let Some(status) = change.account_status {
            self.account_status = status;
        }
        if let Some(name) = &change.display_name {
            self.display_name = Some(name.clone());
        }
        if let Some(username) = &change.username {
            self.username = Some(username.clone());
        }
    }
}

/// Partial profile update.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileChange {
    pub verified_human: Option<HumanVerification>,
    pub verification_method: Option<VerificationMethod>,
    pub verified_at: Option<Timestamp>,
    pub account_status: Option<AccountStatus>,
    pub display_name: Option<String>,
    pub username: Option<String>,
}

impl ProfileChange {
    /// Change applied on approval: verified, tagged, stamped and activated.
    pub fn approved(method: VerificationMethod, at: Timestamp) -> Self {
        Self {
            verified_human: Some(HumanVerification::Verified),
            verification_method: Some(method),
            verified_at: Some(at),
            account_status: Some(AccountStatus::Active),
            ..Self::default()
        }
    }

    /// Public naming only; verification fields are left alone.
    pub fn names(display_name: Option<String>, username: Option<String>) -> Self {
        Self {
            display_name,
            username,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Change applied while a provider has the session under manual review.
    pub fn in_review() -> Self {
        Self {
            verified_human: Some(HumanVerification::Pending),
            ..Self::default()
        }
    }
}
