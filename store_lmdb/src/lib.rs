//! LMDB storage backend for identity-verification state.
//!
//! Implements all storage traits from `idv-store` using the `heed` LMDB
//! bindings. Each logical table maps to one LMDB database within a single
//! environment. Values are bincode-encoded.
//!
//! LMDB allows one writer at a time, so every read-modify-write below runs
//! inside a single write transaction and is atomic with respect to other
//! requests in this process and other processes sharing the environment.

pub mod device;
pub mod environment;
pub mod error;
pub mod profile;
pub mod record;
pub mod session;
pub mod thread;

pub use environment::{LmdbStore, DEFAULT_MAP_SIZE};
pub use error::LmdbError;

/// Separator between components of composite keys.
pub(crate) const KEY_SEP: u8 = 0;

/// Build a composite key `a ++ 0x00 ++ b`.
pub(crate) fn composite_key(a: &str, b: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(a.len() + b.len() + 1);
    key.extend_from_slice(a.as_bytes());
    key.push(KEY_SEP);
    key.extend_from_slice(b.as_bytes());
    key
}

/// Prefix covering every composite key whose first component is `a`.
pub(crate) fn key_prefix(a: &str) -> Vec<u8> {
    let mut prefix = Vec::with_capacity(a.len() + 1);
    prefix.extend_from_slice(a.as_bytes());
    prefix.push(KEY_SEP);
    prefix
}

pub(crate) fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, LmdbError> {
    bincode::serialize(value).map_err(|e| LmdbError::Serialization(e.to_string()))
}

pub(crate) fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T, LmdbError> {
    bincode::deserialize(bytes).map_err(|e| LmdbError::Serialization(e.to_string()))
}
