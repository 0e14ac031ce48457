use idv_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("push configuration missing: {0}")]
    Configuration(String),

    #[error("missing required fields")]
    MissingFields,

    #[error("push transport failed: {0}")]
    Transport(String),

    #[error("push service returned HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
