//! Session ledger: the audit trail of every provider session.

use std::sync::Arc;

use idv_store::{IdvStore, StoreError};
use idv_types::{Clock, SessionUpdate, VerificationSession};

/// Merge-upserts session rows keyed by `(provider, provider_session_id)`.
///
/// Session creation and webhooks race freely; whichever lands first creates
/// the row and the other merges into it. Callers treat failures as
/// best-effort and log them.
#[derive(Clone)]
pub struct SessionLedger {
    store: Arc<dyn IdvStore>,
    clock: Arc<dyn Clock>,
}

impl SessionLedger {
    pub fn new(store: Arc<dyn IdvStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn upsert(&self, update: &SessionUpdate) -> Result<VerificationSession, StoreError> {
        self.store.upsert_session(update, self.clock.now())
    }

    /// Upsert and log on failure.
    pub fn record(&self, update: &SessionUpdate) -> Option<VerificationSession> {
        match self.upsert(update) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::error!(
                    provider = %update.provider,
                    session = %update.provider_session_id,
                    error = %e,
                    "session ledger upsert failed"
                );
                None
            }
        }
    }
}
