//! Direct-message thread membership.

use crate::StoreError;
use idv_types::{ThreadId, UserId};

pub trait ThreadStore {
    /// Add a user to a thread. Adding twice is a no-op.
    fn add_participant(&self, thread_id: &ThreadId, user_id: &UserId) -> Result<(), StoreError>;

    /// Everyone in the thread, in key order.
    fn participants(&self, thread_id: &ThreadId) -> Result<Vec<UserId>, StoreError>;
}
