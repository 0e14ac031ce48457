//! LMDB implementation of VerificationRecordStore.
//!
//! Keys are `user_id ++ 0x00 ++ method`, which makes `(user_id, method)` a
//! real unique key: a losing concurrent insert sees the winner's row inside
//! its write transaction and reports `Duplicate`.

use idv_store::{StoreError, VerificationRecordStore};
use idv_types::{UserId, VerificationMethod, VerificationRecord};

use crate::{composite_key, decode, encode, key_prefix, LmdbError, LmdbStore};

fn record_key(user_id: &UserId, method: VerificationMethod) -> Vec<u8> {
    composite_key(user_id.as_str(), method.as_str())
}

impl VerificationRecordStore for LmdbStore {
    fn find_record(
        &self,
        user_id: &UserId,
        method: VerificationMethod,
    ) -> Result<Option<VerificationRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let record = match self
            .records_db
            .get(&rtxn, &record_key(user_id, method))
            .map_err(LmdbError::from)?
        {
            Some(bytes) => Some(decode(bytes)?),
            None => None,
        };
        Ok(record)
    }

    fn insert_record(&self, record: &VerificationRecord) -> Result<(), StoreError> {
        let key = record_key(&record.user_id, record.method);
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        if self
            .records_db
            .get(&wtxn, &key)
            .map_err(LmdbError::from)?
            .is_some()
        {
            return Err(StoreError::Duplicate(format!(
                "{}/{}",
                record.user_id, record.method
            )));
        }
        self.records_db
            .put(&mut wtxn, &key, &encode(record)?)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn update_record(&self, record: &VerificationRecord) -> Result<(), StoreError> {
        let key = record_key(&record.user_id, record.method);
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        if self
            .records_db
            .get(&wtxn, &key)
            .map_err(LmdbError::from)?
            .is_none()
        {
            return Err(StoreError::NotFound(format!(
                "{}/{}",
                record.user_id, record.method
            )));
        }
        self.records_db
            .put(&mut wtxn, &key, &encode(record)?)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn records_for_user(&self, user_id: &UserId) -> Result<Vec<VerificationRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let prefix = key_prefix(user_id.as_str());
        let iter = self
            .records_db
            .prefix_iter(&rtxn, &prefix)
            .map_err(LmdbError::from)?;
        let mut records = Vec::new();
        for entry in iter {
            let (_key, value) = entry.map_err(LmdbError::from)?;
            records.push(decode(value)?);
        }
        Ok(records)
    }
}
