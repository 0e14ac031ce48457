//! Backend-neutral storage failures.

use thiserror::Error;

/// `Duplicate` and `NotFound` carry meaning for callers (the record
/// reconciler retries on `Duplicate`); the other variants are opaque.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no such row: {0}")]
    NotFound(String),

    #[error("row already exists: {0}")]
    Duplicate(String),

    #[error("store backend failure: {0}")]
    Backend(String),

    #[error("could not encode or decode row: {0}")]
    Serialization(String),
}
