use idv_providers::ProviderError;
use idv_store::StoreError;
use thiserror::Error;

/// Failures creating a session or provisioning an account.
#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("configuration missing: {0}")]
    Configuration(String),

    #[error("missing required fields")]
    MissingFields,

    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Why a webhook was refused before any processing.
///
/// Everything past the authentication gate is acknowledged instead, so
/// these are the only webhook outcomes that are not a success.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WebhookError {
    #[error("webhook secret not configured for {0}")]
    Configuration(String),

    #[error("invalid signature")]
    Signature,

    #[error("stale or invalid timestamp")]
    Replay,
}
