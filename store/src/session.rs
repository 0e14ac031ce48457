//! Session ledger storage trait.

use crate::StoreError;
use idv_types::{Provider, ProviderSessionId, SessionUpdate, Timestamp, VerificationSession};

/// Audit trail of provider sessions keyed by `(provider, provider_session_id)`.
pub trait SessionStore {
    /// Atomically create or merge the row for `update`'s key.
    ///
    /// Implementations must apply [`VerificationSession::upsert`] inside a
    /// single write so concurrent webhook and creation writes both land.
    fn upsert_session(
        &self,
        update: &SessionUpdate,
        now: Timestamp,
    ) -> Result<VerificationSession, StoreError>;

    /// Get a session by key.
    fn get_session(
        &self,
        provider: Provider,
        id: &ProviderSessionId,
    ) -> Result<Option<VerificationSession>, StoreError>;

    /// Number of sessions recorded across all providers.
    fn session_count(&self) -> Result<u64, StoreError>;
}
