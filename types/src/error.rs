//! Top-level error type shared across crates.

use thiserror::Error;

/// Errors raised while constructing or parsing the shared types.
#[derive(Debug, Error)]
pub enum IdvError {
    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    #[error("identifier must not be empty: {0}")]
    EmptyIdentifier(&'static str),

    #[error("unknown verification method: {0}")]
    UnknownMethod(String),
}
