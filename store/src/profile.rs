//! User profile storage trait.

use crate::StoreError;
use idv_types::{ProfileChange, UserId, UserProfile};

/// Profiles belong to the account service; verification only patches them.
pub trait ProfileStore {
    fn get_profile(&self, user_id: &UserId) -> Result<Option<UserProfile>, StoreError>;

    /// Create or replace a profile (account provisioning and tests).
    fn put_profile(&self, profile: &UserProfile) -> Result<(), StoreError>;

    /// Store `profile` unless the user already has one.
    ///
    /// Returns whether a row was written. An existing profile is never
    /// touched, so provisioning can race with verification outcomes.
    fn create_profile(&self, profile: &UserProfile) -> Result<bool, StoreError>;

    /// Apply a partial change to an existing profile.
    ///
    /// Fails with `NotFound` when the user has no profile; this trait never
    /// creates one implicitly.
    fn update_profile(
        &self,
        user_id: &UserId,
        change: &ProfileChange,
    ) -> Result<UserProfile, StoreError>;
}
