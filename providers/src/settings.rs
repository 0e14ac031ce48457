//! Per-provider settings passed in explicitly by the service assembly.

use serde::{Deserialize, Serialize};

/// Credentials and endpoints for one provider.
///
/// Secrets are optional so a service can start with a provider only
/// partially configured; the operations that need a missing value fail
/// with a configuration error at request time.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Base URL of the provider API (no trailing path).
    #[serde(default)]
    pub base_url: String,

    /// API key sent on session creation.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Shared secret for webhook signatures (and request signing where the
    /// provider requires it).
    #[serde(default)]
    pub webhook_secret: Option<String>,

    /// Redirect / callback target embedded in every session request.
    #[serde(default)]
    pub callback_url: String,

    /// Workflow to run (Didit only).
    #[serde(default)]
    pub workflow_id: Option<String>,
}

impl ProviderSettings {
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.is_empty())
    }

    pub fn webhook_secret(&self) -> Option<&str> {
        self.webhook_secret.as_deref().filter(|s| !s.is_empty())
    }
}
