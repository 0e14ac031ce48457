//! Session creation against a provider API.

use std::sync::Arc;

use idv_providers::{
    OutboundRequest, ProviderAdapter, ProviderApi, ProviderError, ProviderSettings,
    SessionCreated, SessionRequest,
};
use idv_types::{Provider, SessionUpdate};
use tracing::Instrument;

use crate::{spans, SessionLedger, VerificationError};

pub struct SessionInitiator {
    adapter: Arc<dyn ProviderAdapter>,
    settings: ProviderSettings,
    api: Arc<dyn ProviderApi>,
    ledger: SessionLedger,
}

impl SessionInitiator {
    pub fn new(
        adapter: Arc<dyn ProviderAdapter>,
        settings: ProviderSettings,
        api: Arc<dyn ProviderApi>,
        ledger: SessionLedger,
    ) -> Self {
        Self {
            adapter,
            settings,
            api,
            ledger,
        }
    }

    pub fn provider(&self) -> Provider {
        self.adapter.provider()
    }

    /// Ask the provider for a new session and record it in the ledger.
    ///
    /// The ledger write is best-effort: the caller gets the session even if
    /// recording it failed.
    pub async fn create_session(
        &self,
        request: &SessionRequest,
    ) -> Result<SessionCreated, VerificationError> {
        let span = spans::session_create_span(self.provider(), &request.user_id);
        self.create_session_inner(request).instrument(span).await
    }

    async fn create_session_inner(
        &self,
        request: &SessionRequest,
    ) -> Result<SessionCreated, VerificationError> {
        let outbound = self.prepare(request)?;
        let response = self.api.send(outbound).await?;
        if !response.is_success() {
            tracing::warn!(status = response.status, "provider rejected session creation");
            return Err(ProviderError::Api {
                status: response.status,
                body: response.body_text(),
            }
            .into());
        }

        let created = self.adapter.parse_session_response(&response.body)?;
        tracing::info!(session = %created.provider_session_id, "session created");

        self.ledger.record(
            &SessionUpdate::new(self.provider(), created.provider_session_id.clone())
                .user(Some(request.user_id.clone()))
                .url(Some(created.session_url.clone()))
                .token(created.session_token.clone())
                .status(self.adapter.initial_status()),
        );

        Ok(created)
    }

    /// Build, serialize once, sign those exact bytes where required.
    fn prepare(&self, request: &SessionRequest) -> Result<OutboundRequest, VerificationError> {
        let name = self.provider().display_name();
        let api_key = self
            .settings
            .api_key()
            .ok_or_else(|| VerificationError::Configuration(format!("{name} API key")))?;

        let body = self.adapter.build_session_request(request)?;
        let body = serde_json::to_vec(&body)
            .map_err(|e| VerificationError::Serialization(e.to_string()))?;

        let mut headers = vec![(self.adapter.api_key_header().to_string(), api_key.to_string())];
        if self.adapter.signs_requests() {
            let secret = self.settings.webhook_secret().ok_or_else(|| {
                VerificationError::Configuration(format!("{name} shared secret"))
            })?;
            headers.push((
                self.adapter.signature_header().to_string(),
                idv_crypto::sign_hex(&body, secret),
            ));
        }

        Ok(OutboundRequest {
            url: self.adapter.session_endpoint(&self.settings.base_url),
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idv_nullables::{NullClock, NullProviderApi, NullStore};
    use idv_providers::adapter_for;
    use idv_store::SessionStore;
    use idv_types::{ProviderSessionId, UserId};

    fn settings() -> ProviderSettings {
        ProviderSettings {
            base_url: "https://api.example".into(),
            api_key: Some("key".into()),
            webhook_secret: Some("secret".into()),
            callback_url: "app://cb".into(),
            workflow_id: Some("wf".into()),
        }
    }

    fn initiator(
        provider: Provider,
        settings: ProviderSettings,
        api: Arc<NullProviderApi>,
        store: Arc<NullStore>,
    ) -> SessionInitiator {
        SessionInitiator::new(
            Arc::from(adapter_for(provider, &settings)),
            settings,
            api,
            SessionLedger::new(store, Arc::new(NullClock::new(50))),
        )
    }

    fn request() -> SessionRequest {
        SessionRequest::for_user(UserId::new("u1").unwrap())
    }

    #[tokio::test]
    async fn creation_records_ledger_row() {
        let api = Arc::new(NullProviderApi::new());
        api.respond(200, r#"{"session_id":"s1","url":"https://x"}"#);
        let store = Arc::new(NullStore::new());
        let init = initiator(Provider::Didit, settings(), api.clone(), store.clone());

        let created = init.create_session(&request()).await.unwrap();
        assert_eq!(created.provider_session_id.as_str(), "s1");

        let row = store
            .get_session(Provider::Didit, &ProviderSessionId::new("s1").unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(row.user_id, Some(UserId::new("u1").unwrap()));
        assert_eq!(row.session_url, "https://x");
        assert_eq!(row.raw_status, "Not Started");

        let sent = api.requests();
        assert_eq!(sent[0].url, "https://api.example/v2/session/");
        assert!(sent[0]
            .headers
            .contains(&("x-api-key".to_string(), "key".to_string())));
    }

    #[tokio::test]
    async fn veriff_signs_the_exact_body() {
        let api = Arc::new(NullProviderApi::new());
        api.respond(
            201,
            r#"{"verification":{"id":"v1","url":"https://v","sessionToken":"t"}}"#,
        );
        let store = Arc::new(NullStore::new());
        let init = initiator(Provider::Veriff, settings(), api.clone(), store.clone());

        let created = init.create_session(&request()).await.unwrap();
        assert_eq!(created.session_token.as_deref(), Some("t"));

        let sent = &api.requests()[0];
        let signature = sent
            .headers
            .iter()
            .find(|(name, _)| name == "x-hmac-signature")
            .map(|(_, value)| value.clone())
            .unwrap();
        assert!(idv_crypto::verify_signature(&sent.body, &signature, "secret"));

        let row = store
            .get_session(Provider::Veriff, &ProviderSessionId::new("v1").unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(row.raw_status, "created");
        assert_eq!(row.session_token.as_deref(), Some("t"));
    }

    #[tokio::test]
    async fn provider_error_carries_body() {
        let api = Arc::new(NullProviderApi::new());
        api.respond(403, r#"{"detail":"bad key"}"#);
        let store = Arc::new(NullStore::new());
        let init = initiator(Provider::Didit, settings(), api, store.clone());

        let err = init.create_session(&request()).await.unwrap_err();
        match err {
            VerificationError::Provider(ProviderError::Api { status, body }) => {
                assert_eq!(status, 403);
                assert!(body.contains("bad key"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(store.session_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn missing_api_key_is_configuration_error() {
        let api = Arc::new(NullProviderApi::new());
        let mut settings = settings();
        settings.api_key = None;
        let init = initiator(Provider::Didit, settings, api.clone(), Arc::new(NullStore::new()));

        let err = init.create_session(&request()).await.unwrap_err();
        assert!(matches!(err, VerificationError::Configuration(_)));
        assert!(api.requests().is_empty());
    }

    #[tokio::test]
    async fn ledger_failure_does_not_fail_creation() {
        let api = Arc::new(NullProviderApi::new());
        api.respond(200, r#"{"session_id":"s1","url":"https://x"}"#);
        let store = Arc::new(NullStore::new());
        store.fail_writes(true);
        let init = initiator(Provider::Didit, settings(), api, store);
        assert!(init.create_session(&request()).await.is_ok());
    }
}
