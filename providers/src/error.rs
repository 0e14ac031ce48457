use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider configuration missing: {0}")]
    Configuration(String),

    #[error("HTTP request to provider failed: {0}")]
    Transport(String),

    #[error("provider API returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("invalid response from provider: {0}")]
    InvalidResponse(String),
}
