//! LMDB implementation of SessionStore.
//!
//! Keys are `provider ++ 0x00 ++ provider_session_id`.

use idv_store::{SessionStore, StoreError};
use idv_types::{Provider, ProviderSessionId, SessionUpdate, Timestamp, VerificationSession};

use crate::{composite_key, decode, encode, LmdbError, LmdbStore};

fn session_key(provider: Provider, id: &ProviderSessionId) -> Vec<u8> {
    composite_key(provider.as_str(), id.as_str())
}

impl SessionStore for LmdbStore {
    fn upsert_session(
        &self,
        update: &SessionUpdate,
        now: Timestamp,
    ) -> Result<VerificationSession, StoreError> {
        let key = session_key(update.provider, &update.provider_session_id);
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;

        let existing = match self.sessions_db.get(&wtxn, &key).map_err(LmdbError::from)? {
            Some(bytes) => Some(decode::<VerificationSession>(bytes)?),
            None => None,
        };
        let created = existing.is_none();
        let session = VerificationSession::upsert(existing, update, now);

        self.sessions_db
            .put(&mut wtxn, &key, &encode(&session)?)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;

        tracing::trace!(
            provider = %update.provider,
            session_id = %update.provider_session_id,
            created,
            "session upserted"
        );
        Ok(session)
    }

    fn get_session(
        &self,
        provider: Provider,
        id: &ProviderSessionId,
    ) -> Result<Option<VerificationSession>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let session = match self
            .sessions_db
            .get(&rtxn, &session_key(provider, id))
            .map_err(LmdbError::from)?
        {
            Some(bytes) => Some(decode(bytes)?),
            None => None,
        };
        Ok(session)
    }

    fn session_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let count = self.sessions_db.len(&rtxn).map_err(LmdbError::from)?;
        Ok(count)
    }
}
