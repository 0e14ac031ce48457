//! The provider adapter seam.

use idv_types::{CanonicalStatus, Provider, ProviderSessionId, UserId};
use serde::Serialize;
use thiserror::Error;

use crate::{DiditAdapter, ProviderError, ProviderSettings, VeriffAdapter};

/// A webhook body normalized into provider-agnostic fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedWebhook {
    pub provider_session_id: ProviderSessionId,
    /// Echoed back from the vendor-data field set at session creation.
    /// `None` when the provider omitted it.
    pub user_id: Option<UserId>,
    /// Status string exactly as the provider sent it.
    pub raw_status: String,
    pub status: CanonicalStatus,
    /// Provider decision detail, used as the rejection reason on decline.
    pub detail: Option<String>,
    pub session_url: Option<String>,
}

/// Why a correctly signed webhook could not be normalized.
///
/// These are acknowledged, not rejected: a provider retries anything that
/// is not a success, and retrying an unusable payload never helps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum MalformedPayload {
    #[error("body is not valid JSON")]
    InvalidJson,

    #[error("session id or status missing")]
    MissingFields,

    #[error("no verification object in payload")]
    NoVerificationData,
}

impl MalformedPayload {
    /// Marker returned to the provider in the acknowledgement body.
    pub fn marker(&self) -> &'static str {
        match self {
            Self::InvalidJson => "invalid_json",
            Self::MissingFields => "missing_fields",
            Self::NoVerificationData => "no_verification_data",
        }
    }
}

/// What the caller supplies when asking for a new session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionRequest {
    pub user_id: UserId,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl SessionRequest {
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id,
            email: None,
            first_name: None,
            last_name: None,
        }
    }
}

/// A session the provider has just created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SessionCreated {
    #[serde(rename = "session_id")]
    pub provider_session_id: ProviderSessionId,
    #[serde(rename = "url")]
    pub session_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Per-provider translation between wire payloads and the shared types.
pub trait ProviderAdapter: Send + Sync {
    fn provider(&self) -> Provider;

    /// Header carrying the webhook HMAC.
    fn signature_header(&self) -> &'static str;

    /// Header carrying the webhook send time, for providers that send one.
    fn timestamp_header(&self) -> Option<&'static str>;

    /// Header carrying the API key on outbound requests.
    fn api_key_header(&self) -> &'static str;

    /// Whether outbound request bodies must be HMAC-signed.
    fn signs_requests(&self) -> bool;

    /// Full session-creation URL for a given API base URL.
    fn session_endpoint(&self, base_url: &str) -> String;

    /// Status recorded in the ledger when a session is first created.
    fn initial_status(&self) -> &'static str;

    /// Map a provider status string onto the canonical outcome.
    /// Comparison is case-insensitive.
    fn map_status(&self, raw_status: &str) -> CanonicalStatus;

    /// Build the JSON body for a session-creation request. The user id is
    /// embedded as the vendor-echo field.
    fn build_session_request(
        &self,
        request: &SessionRequest,
    ) -> Result<serde_json::Value, ProviderError>;

    fn parse_session_response(&self, raw: &[u8]) -> Result<SessionCreated, ProviderError>;

    fn parse_webhook(&self, raw_body: &[u8]) -> Result<ParsedWebhook, MalformedPayload>;
}

/// Build the adapter for a provider from its settings.
pub fn adapter_for(provider: Provider, settings: &ProviderSettings) -> Box<dyn ProviderAdapter> {
    match provider {
        Provider::Didit => Box::new(DiditAdapter::new(
            settings.callback_url.clone(),
            settings.workflow_id.clone(),
        )),
        Provider::Veriff => Box::new(VeriffAdapter::new(settings.callback_url.clone())),
    }
}

// ── Shared JSON helpers ────────────────────────────────────────────────

/// Non-empty string at `key`, ignoring non-string values.
pub(crate) fn str_field(value: &serde_json::Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(serde_json::Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Normalize a status string for case-insensitive comparison.
pub(crate) fn normalize_status(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}
