//! Abstract storage traits for identity-verification state.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The rest of the codebase depends only on the traits.
//!
//! Each trait owns one logical table. The session ledger and the
//! verification records are written independently from the same event, so
//! a failure in one never blocks the other.

pub mod device;
pub mod error;
pub mod profile;
pub mod record;
pub mod session;
pub mod thread;

pub use device::DeviceTokenStore;
pub use error::StoreError;
pub use profile::ProfileStore;
pub use record::VerificationRecordStore;
pub use session::SessionStore;
pub use thread::ThreadStore;

/// Everything the verification service needs from a backend.
pub trait IdvStore:
    SessionStore
        + VerificationRecordStore
        + ProfileStore
        + DeviceTokenStore
        + ThreadStore
        + Send
        + Sync
{
}

impl<T> IdvStore for T where
    T: SessionStore
        + VerificationRecordStore
        + ProfileStore
        + DeviceTokenStore
        + ThreadStore
        + Send
        + Sync
{
}
