//! LMDB implementation of ThreadStore.
//!
//! Same layout as device tokens: `thread_id ++ 0x00 ++ user_id` with an
//! empty value.

use idv_store::{StoreError, ThreadStore};
use idv_types::{ThreadId, UserId};

use crate::{composite_key, key_prefix, LmdbError, LmdbStore};

impl ThreadStore for LmdbStore {
    fn add_participant(&self, thread_id: &ThreadId, user_id: &UserId) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.thread_members_db
            .put(
                &mut wtxn,
                &composite_key(thread_id.as_str(), user_id.as_str()),
                &[],
            )
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn participants(&self, thread_id: &ThreadId) -> Result<Vec<UserId>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let prefix = key_prefix(thread_id.as_str());
        let iter = self
            .thread_members_db
            .prefix_iter(&rtxn, &prefix)
            .map_err(LmdbError::from)?;
        let mut members = Vec::new();
        for entry in iter {
            let (key, _value) = entry.map_err(LmdbError::from)?;
            let raw = std::str::from_utf8(&key[prefix.len()..])
                .map_err(|e| StoreError::Serialization(e.to_string()))?;
            let user = UserId::new(raw).map_err(|e| StoreError::Serialization(e.to_string()))?;
            members.push(user);
        }
        Ok(members)
    }
}
