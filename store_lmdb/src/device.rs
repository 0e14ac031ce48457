//! LMDB implementation of DeviceTokenStore.
//!
//! One entry per `user_id ++ 0x00 ++ token` with an empty value, so
//! registration is idempotent and listing is a prefix scan.

use idv_store::{DeviceTokenStore, StoreError};
use idv_types::UserId;

use crate::{composite_key, key_prefix, LmdbError, LmdbStore};

impl DeviceTokenStore for LmdbStore {
    fn register_token(&self, user_id: &UserId, token: &str) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.device_tokens_db
            .put(&mut wtxn, &composite_key(user_id.as_str(), token), &[])
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn remove_token(&self, user_id: &UserId, token: &str) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.device_tokens_db
            .delete(&mut wtxn, &composite_key(user_id.as_str(), token))
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn tokens_for(&self, user_id: &UserId) -> Result<Vec<String>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let prefix = key_prefix(user_id.as_str());
        let iter = self
            .device_tokens_db
            .prefix_iter(&rtxn, &prefix)
            .map_err(LmdbError::from)?;
        let mut tokens = Vec::new();
        for entry in iter {
            let (key, _value) = entry.map_err(LmdbError::from)?;
            let token = std::str::from_utf8(&key[prefix.len()..])
                .map_err(|e| StoreError::Serialization(e.to_string()))?;
            tokens.push(token.to_string());
        }
        Ok(tokens)
    }
}
