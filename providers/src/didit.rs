//! Didit adapter.
//!
//! Webhooks carry `X-Signature` (HMAC-SHA256 hex of the body) and
//! `X-Timestamp` (Unix seconds). Payload fields are top level:
//! `session_id`, `status` ("Approved", "Declined", "In Review", ...),
//! `vendor_data` (our user id) and, once final, a `decision` object.

use idv_types::{CanonicalStatus, PendingKind, Provider, ProviderSessionId, UserId};
use serde_json::{json, Value};

use crate::adapter::{normalize_status, str_field};
use crate::{
    MalformedPayload, ParsedWebhook, ProviderAdapter, ProviderError, SessionCreated,
    SessionRequest,
};

pub const DEFAULT_BASE_URL: &str = "https://verification.didit.me";

pub struct DiditAdapter {
    callback_url: String,
    workflow_id: Option<String>,
}

impl DiditAdapter {
    pub fn new(callback_url: impl Into<String>, workflow_id: Option<String>) -> Self {
        Self {
            callback_url: callback_url.into(),
            workflow_id: workflow_id.filter(|w| !w.is_empty()),
        }
    }
}

impl ProviderAdapter for DiditAdapter {
    fn provider(&self) -> Provider {
        Provider::Didit
    }

    fn signature_header(&self) -> &'static str {
        "x-signature"
    }

    fn timestamp_header(&self) -> Option<&'static str> {
        Some("x-timestamp")
    }

    fn api_key_header(&self) -> &'static str {
        "x-api-key"
    }

    fn signs_requests(&self) -> bool {
        false
    }

    fn session_endpoint(&self, base_url: &str) -> String {
        format!("{}/v2/session/", base_url.trim_end_matches('/'))
    }

    fn initial_status(&self) -> &'static str {
        "Not Started"
    }

    fn map_status(&self, raw_status: &str) -> CanonicalStatus {
        match normalize_status(raw_status).as_str() {
            "approved" => CanonicalStatus::Approved,
            "declined" => CanonicalStatus::Declined,
            "in review" => CanonicalStatus::Pending(PendingKind::InReview),
            _ => CanonicalStatus::Pending(PendingKind::Other),
        }
    }

    fn build_session_request(&self, request: &SessionRequest) -> Result<Value, ProviderError> {
        let workflow_id = self
            .workflow_id
            .as_deref()
            .ok_or_else(|| ProviderError::Configuration("Didit workflow id".into()))?;

        let mut body = json!({
            "workflow_id": workflow_id,
            "vendor_data": request.user_id.as_str(),
            "callback": self.callback_url,
        });
        if let Some(email) = request.email.as_deref().filter(|e| !e.is_empty()) {
            body["contact_details"] = json!({ "email": email });
        }
        Ok(body)
    }

    fn parse_session_response(&self, raw: &[u8]) -> Result<SessionCreated, ProviderError> {
        let value: Value = serde_json::from_slice(raw)
            .map_err(|e| ProviderError::InvalidResponse(format!("Didit session response: {e}")))?;
        let id = str_field(&value, "session_id")
            .ok_or_else(|| ProviderError::InvalidResponse("Didit response missing session_id".into()))?;
        Ok(SessionCreated {
            provider_session_id: ProviderSessionId::new(id)
                .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?,
            session_url: str_field(&value, "url").unwrap_or_default(),
            session_token: None,
            status: str_field(&value, "status"),
        })
    }

    fn parse_webhook(&self, raw_body: &[u8]) -> Result<ParsedWebhook, MalformedPayload> {
        let value: Value =
            serde_json::from_slice(raw_body).map_err(|_| MalformedPayload::InvalidJson)?;

        let session_id = str_field(&value, "session_id");
        let raw_status = str_field(&value, "status");
        let (Some(session_id), Some(raw_status)) = (session_id, raw_status) else {
            return Err(MalformedPayload::MissingFields);
        };
        let provider_session_id =
            ProviderSessionId::new(session_id).map_err(|_| MalformedPayload::MissingFields)?;

        let detail = value
            .pointer("/decision/kyc/document_status")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .or_else(|| str_field(&value, "reason"));

        Ok(ParsedWebhook {
            provider_session_id,
            user_id: str_field(&value, "vendor_data").and_then(|u| UserId::new(u).ok()),
            status: self.map_status(&raw_status),
            raw_status,
            detail,
            session_url: str_field(&value, "url"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter() -> DiditAdapter {
        DiditAdapter::new("app://callback", Some("wf-1".into()))
    }

    #[test]
    fn status_mapping_is_case_insensitive() {
        let a = adapter();
        for raw in ["approved", "Approved", "APPROVED"] {
            assert_eq!(a.map_status(raw), CanonicalStatus::Approved);
        }
        assert_eq!(a.map_status("Declined"), CanonicalStatus::Declined);
        assert_eq!(
            a.map_status("In Review"),
            CanonicalStatus::Pending(PendingKind::InReview)
        );
        for raw in ["In Progress", "Abandoned", "Not Started", "Expired"] {
            assert_eq!(a.map_status(raw), CanonicalStatus::Pending(PendingKind::Other));
        }
    }

    #[test]
    fn parses_final_webhook() {
        let body = br#"{
            "session_id": "s1",
            "status": "Declined",
            "vendor_data": "u1",
            "decision": { "kyc": { "document_status": "Expired document" } }
        }"#;
        let parsed = adapter().parse_webhook(body).unwrap();
        assert_eq!(parsed.provider_session_id.as_str(), "s1");
        assert_eq!(parsed.user_id.as_ref().map(UserId::as_str), Some("u1"));
        assert_eq!(parsed.status, CanonicalStatus::Declined);
        assert_eq!(parsed.detail.as_deref(), Some("Expired document"));
    }

    #[test]
    fn detail_falls_back_to_reason() {
        let body = br#"{"session_id":"s1","status":"Declined","reason":"Face mismatch"}"#;
        let parsed = adapter().parse_webhook(body).unwrap();
        assert_eq!(parsed.detail.as_deref(), Some("Face mismatch"));
        assert!(parsed.user_id.is_none());
    }

    #[test]
    fn missing_status_is_missing_fields() {
        assert_eq!(
            adapter().parse_webhook(br#"{"session_id":"s1"}"#),
            Err(MalformedPayload::MissingFields)
        );
        assert_eq!(
            adapter().parse_webhook(b"not json"),
            Err(MalformedPayload::InvalidJson)
        );
    }

    #[test]
    fn session_request_embeds_user_and_email() {
        let mut req = SessionRequest::for_user(UserId::new("u1").unwrap());
        req.email = Some("a@b.c".into());
        let body = adapter().build_session_request(&req).unwrap();
        assert_eq!(body["vendor_data"], "u1");
        assert_eq!(body["workflow_id"], "wf-1");
        assert_eq!(body["callback"], "app://callback");
        assert_eq!(body["contact_details"]["email"], "a@b.c");
    }

    #[test]
    fn session_request_without_workflow_is_configuration_error() {
        let a = DiditAdapter::new("app://callback", None);
        let req = SessionRequest::for_user(UserId::new("u1").unwrap());
        assert!(matches!(
            a.build_session_request(&req),
            Err(ProviderError::Configuration(_))
        ));
    }

    #[test]
    fn parses_session_response() {
        let created = adapter()
            .parse_session_response(br#"{"session_id":"s1","url":"https://x","status":"Not Started"}"#)
            .unwrap();
        assert_eq!(created.provider_session_id.as_str(), "s1");
        assert_eq!(created.session_url, "https://x");
        assert_eq!(created.status.as_deref(), Some("Not Started"));
    }

    #[test]
    fn endpoint_tolerates_trailing_slash() {
        assert_eq!(
            adapter().session_endpoint("https://verification.didit.me/"),
            "https://verification.didit.me/v2/session/"
        );
    }
}
