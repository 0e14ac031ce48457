//! LMDB implementation of ProfileStore.

use idv_store::{ProfileStore, StoreError};
use idv_types::{ProfileChange, UserId, UserProfile};

use crate::{decode, encode, LmdbError, LmdbStore};

impl ProfileStore for LmdbStore {
    fn get_profile(&self, user_id: &UserId) -> Result<Option<UserProfile>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let profile = match self
            .profiles_db
            .get(&rtxn, user_id.as_str().as_bytes())
            .map_err(LmdbError::from)?
        {
            Some(bytes) => Some(decode(bytes)?),
            None => None,
        };
        Ok(profile)
    }

    fn put_profile(&self, profile: &UserProfile) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.profiles_db
            .put(
                &mut wtxn,
                profile.user_id.as_str().as_bytes(),
                &encode(profile)?,
            )
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn create_profile(&self, profile: &UserProfile) -> Result<bool, StoreError> {
        let key = profile.user_id.as_str().as_bytes();
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        if self
            .profiles_db
            .get(&wtxn, key)
            .map_err(LmdbError::from)?
            .is_some()
        {
            return Ok(false);
        }
        self.profiles_db
            .put(&mut wtxn, key, &encode(profile)?)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(true)
    }

    fn update_profile(
        &self,
        user_id: &UserId,
        change: &ProfileChange,
    ) -> Result<UserProfile, StoreError> {
        let key = user_id.as_str().as_bytes();
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let mut profile: UserProfile = match self
            .profiles_db
            .get(&wtxn, key)
            .map_err(LmdbError::from)?
        {
            Some(bytes) => decode(bytes)?,
            None => return Err(StoreError::NotFound(format!("profile {user_id}"))),
        };
        profile.apply(change);
        self.profiles_db
            .put(&mut wtxn, key, &encode(&profile)?)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idv_types::{AccountStatus, HumanVerification, Timestamp, VerificationMethod};

    fn temp_store() -> (tempfile::TempDir, LmdbStore) {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = LmdbStore::open(dir.path(), 16 * 1024 * 1024).expect("open store");
        (dir, store)
    }

    #[test]
    fn update_missing_profile_is_not_found() {
        let (_dir, store) = temp_store();
        let err = store
            .update_profile(&UserId::new("ghost").unwrap(), &ProfileChange::in_review())
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        assert!(store
            .get_profile(&UserId::new("ghost").unwrap())
            .unwrap()
            .is_none());
    }

    #[test]
    fn create_never_overwrites() {
        let (_dir, store) = temp_store();
        let uid = UserId::new("u1").unwrap();
        assert!(store.create_profile(&UserProfile::new(uid.clone())).unwrap());
        store
            .update_profile(&uid, &ProfileChange::in_review())
            .unwrap();

        assert!(!store.create_profile(&UserProfile::new(uid.clone())).unwrap());
        let profile = store.get_profile(&uid).unwrap().unwrap();
        assert_eq!(profile.verified_human, HumanVerification::Pending);
    }

    #[test]
    fn approval_change_persists() {
        let (_dir, store) = temp_store();
        let uid = UserId::new("u1").unwrap();
        store.put_profile(&UserProfile::new(uid.clone())).unwrap();

        store
            .update_profile(
                &uid,
                &ProfileChange::approved(VerificationMethod::IdDocument, Timestamp::new(99)),
            )
            .unwrap();

        let profile = store.get_profile(&uid).unwrap().unwrap();
        assert_eq!(profile.verified_human, HumanVerification::Verified);
        assert_eq!(profile.account_status, AccountStatus::Active);
        assert_eq!(profile.verified_at, Some(Timestamp::new(99)));
    }
}
