//! Push notification device token storage trait.

use crate::StoreError;
use idv_types::UserId;

pub trait DeviceTokenStore {
    /// Register a device token for a user. Registering twice is a no-op.
    fn register_token(&self, user_id: &UserId, token: &str) -> Result<(), StoreError>;

    /// Remove a device token (e.g. after the push service reports it invalid).
    fn remove_token(&self, user_id: &UserId, token: &str) -> Result<(), StoreError>;

    /// All tokens registered for a user.
    fn tokens_for(&self, user_id: &UserId) -> Result<Vec<String>, StoreError>;
}
