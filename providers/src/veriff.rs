//! Veriff adapter.
//!
//! Everything interesting sits under a `verification` object, both in
//! decision webhooks and in the session-creation response. Outbound
//! requests are signed with the shared secret as well as carrying the
//! API key.

use idv_types::{CanonicalStatus, PendingKind, Provider, ProviderSessionId, UserId};
use serde_json::{json, Value};

use crate::adapter::{normalize_status, str_field};
use crate::{
    MalformedPayload, ParsedWebhook, ProviderAdapter, ProviderError, SessionCreated,
    SessionRequest,
};

pub const DEFAULT_BASE_URL: &str = "https://stationapi.veriff.com";

pub struct VeriffAdapter {
    callback_url: String,
}

impl VeriffAdapter {
    pub fn new(callback_url: impl Into<String>) -> Self {
        Self {
            callback_url: callback_url.into(),
        }
    }
}

impl ProviderAdapter for VeriffAdapter {
    fn provider(&self) -> Provider {
        Provider::Veriff
    }

    fn signature_header(&self) -> &'static str {
        "x-hmac-signature"
    }

    fn timestamp_header(&self) -> Option<&'static str> {
        None
    }

    fn api_key_header(&self) -> &'static str {
        "x-auth-client"
    }

    fn signs_requests(&self) -> bool {
        true
    }

    fn session_endpoint(&self, base_url: &str) -> String {
        format!("{}/v1/sessions", base_url.trim_end_matches('/'))
    }

    fn initial_status(&self) -> &'static str {
        "created"
    }

    fn map_status(&self, raw_status: &str) -> CanonicalStatus {
        match normalize_status(raw_status).as_str() {
            "approved" => CanonicalStatus::Approved,
            "declined" => CanonicalStatus::Declined,
            "review" | "in review" | "in_review" => CanonicalStatus::Pending(PendingKind::InReview),
            _ => CanonicalStatus::Pending(PendingKind::Other),
        }
    }

    fn build_session_request(&self, request: &SessionRequest) -> Result<Value, ProviderError> {
        let mut verification = json!({
            "callback": self.callback_url,
            "vendorData": request.user_id.as_str(),
        });
        let first = request.first_name.as_deref().filter(|s| !s.is_empty());
        let last = request.last_name.as_deref().filter(|s| !s.is_empty());
        if first.is_some() || last.is_some() {
            let mut person = serde_json::Map::new();
            if let Some(first) = first {
                person.insert("firstName".into(), json!(first));
            }
            if let Some(last) = last {
                person.insert("lastName".into(), json!(last));
            }
            verification["person"] = Value::Object(person);
        }
        Ok(json!({ "verification": verification }))
    }

    fn parse_session_response(&self, raw: &[u8]) -> Result<SessionCreated, ProviderError> {
        let value: Value = serde_json::from_slice(raw).map_err(|e| {
            ProviderError::InvalidResponse(format!("Veriff session response: {e}"))
        })?;
        let verification = value.get("verification").ok_or_else(|| {
            ProviderError::InvalidResponse("Veriff response missing verification".into())
        })?;
        let id = str_field(verification, "id").ok_or_else(|| {
            ProviderError::InvalidResponse("Veriff response missing verification.id".into())
        })?;
        Ok(SessionCreated {
            provider_session_id: ProviderSessionId::new(id)
                .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?,
            session_url: str_field(verification, "url").unwrap_or_default(),
            session_token: str_field(verification, "sessionToken"),
            status: str_field(verification, "status"),
        })
    }

    fn parse_webhook(&self, raw_body: &[u8]) -> Result<ParsedWebhook, MalformedPayload> {
        let value: Value =
            serde_json::from_slice(raw_body).map_err(|_| MalformedPayload::InvalidJson)?;
        let verification = value
            .get("verification")
            .filter(|v| v.is_object())
            .ok_or(MalformedPayload::NoVerificationData)?;

        let (Some(id), Some(raw_status)) = (
            str_field(verification, "id"),
            str_field(verification, "status"),
        ) else {
            return Err(MalformedPayload::MissingFields);
        };

        Ok(ParsedWebhook {
            provider_session_id: ProviderSessionId::new(id)
                .map_err(|_| MalformedPayload::MissingFields)?,
            user_id: str_field(verification, "vendorData").and_then(|u| UserId::new(u).ok()),
            status: self.map_status(&raw_status),
            raw_status,
            detail: str_field(verification, "reason"),
            session_url: None,
        })
    }
}
