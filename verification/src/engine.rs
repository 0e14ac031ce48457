//! Inbound decision webhooks.
//!
//! Pipeline per request:
//!
//! ```text
//! secret ──► signature ──► timestamp ──► parse ──► ledger ──► user? ──► reconcile ──► push
//!   500        401           401        200*                  200*
//! ```
//!
//! Nothing is written before the three authentication gates pass. After
//! that every outcome is acknowledged with a success so the provider stops
//! retrying; the acknowledgement says what happened.

use std::collections::HashMap;
use std::sync::Arc;

use idv_crypto::{is_fresh, parse_timestamp_header, verify_signature, REPLAY_WINDOW_SECS};
use idv_notify::{verification_message, Notifier};
use idv_providers::{MalformedPayload, ParsedWebhook, ProviderAdapter};
use idv_types::{CanonicalStatus, Clock, Provider, SessionUpdate};
use tracing::Instrument;

use crate::{spans, ReconcileReport, RecordReconciler, SessionLedger, WebhookError, WebhookHeaders};

/// A provider's adapter plus the secret its webhooks are signed with.
#[derive(Clone)]
pub struct ProviderBinding {
    pub adapter: Arc<dyn ProviderAdapter>,
    pub webhook_secret: Option<String>,
}

impl ProviderBinding {
    pub fn new(adapter: Arc<dyn ProviderAdapter>, webhook_secret: Option<String>) -> Self {
        Self {
            adapter,
            webhook_secret: webhook_secret.filter(|s| !s.is_empty()),
        }
    }
}

/// Successful webhook outcomes. All of them are acknowledged to the provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WebhookAck {
    /// Recorded and, for a known user, reconciled.
    Processed {
        status: CanonicalStatus,
        report: ReconcileReport,
    },
    /// Authentic but unusable body.
    Malformed(MalformedPayload),
    /// Recorded in the ledger, but the body carried no user id.
    MissingUser { status: CanonicalStatus },
}

pub struct WebhookEngine {
    bindings: HashMap<Provider, ProviderBinding>,
    ledger: SessionLedger,
    reconciler: RecordReconciler,
    notifier: Option<Notifier>,
    clock: Arc<dyn Clock>,
    replay_window_secs: u64,
}

impl WebhookEngine {
    pub fn new(ledger: SessionLedger, reconciler: RecordReconciler, clock: Arc<dyn Clock>) -> Self {
        Self {
            bindings: HashMap::new(),
            ledger,
            reconciler,
            notifier: None,
            clock,
            replay_window_secs: REPLAY_WINDOW_SECS,
        }
    }

    pub fn with_provider(mut self, binding: ProviderBinding) -> Self {
        self.bindings.insert(binding.adapter.provider(), binding);
        self
    }

    pub fn with_notifier(mut self, notifier: Notifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn with_replay_window(mut self, secs: u64) -> Self {
        self.replay_window_secs = secs;
        self
    }

    /// Header that marks a request to `provider`'s endpoint as a webhook.
    pub fn signature_header(&self, provider: Provider) -> Option<&'static str> {
        self.bindings
            .get(&provider)
            .map(|b| b.adapter.signature_header())
    }

    pub async fn handle(
        &self,
        provider: Provider,
        headers: &WebhookHeaders,
        raw_body: &[u8],
    ) -> Result<WebhookAck, WebhookError> {
        let span = spans::webhook_span(provider);
        self.handle_inner(provider, headers, raw_body)
            .instrument(span)
            .await
    }

    async fn handle_inner(
        &self,
        provider: Provider,
        headers: &WebhookHeaders,
        raw_body: &[u8],
    ) -> Result<WebhookAck, WebhookError> {
        let binding = self
            .bindings
            .get(&provider)
            .ok_or_else(|| WebhookError::Configuration(provider.to_string()))?;
        self.authenticate(binding, headers, raw_body)?;

        let parsed = match binding.adapter.parse_webhook(raw_body) {
            Ok(parsed) => parsed,
            Err(kind) => {
                tracing::warn!(reason = %kind, "acknowledging malformed webhook");
                return Ok(WebhookAck::Malformed(kind));
            }
        };
        tracing::Span::current().record("session", tracing::field::display(&parsed.provider_session_id));
        tracing::info!(raw_status = %parsed.raw_status, status = %parsed.status, "webhook received");

        self.ledger.record(&ledger_update(provider, &parsed, raw_body));

        let Some(user_id) = parsed.user_id.as_ref() else {
            tracing::error!("webhook carries no user id, skipping reconciliation");
            return Ok(WebhookAck::MissingUser {
                status: parsed.status,
            });
        };

        let report = self.reconciler.reconcile(
            provider,
            &parsed.provider_session_id,
            user_id,
            parsed.status,
            parsed.detail.as_deref(),
        );

        if let Some(notifier) = &self.notifier {
            if let Some(message) =
                verification_message(provider, parsed.status, parsed.detail.as_deref())
            {
                notifier.notify_user(user_id, message).await;
            }
        }

        Ok(WebhookAck::Processed {
            status: parsed.status,
            report,
        })
    }

    fn authenticate(
        &self,
        binding: &ProviderBinding,
        headers: &WebhookHeaders,
        raw_body: &[u8],
    ) -> Result<(), WebhookError> {
        let adapter = &binding.adapter;
        let secret = binding
            .webhook_secret
            .as_deref()
            .ok_or_else(|| WebhookError::Configuration(adapter.provider().to_string()))?;

        let signature = headers
            .get(adapter.signature_header())
            .ok_or(WebhookError::Signature)?;
        if !verify_signature(raw_body, signature, secret) {
            tracing::warn!("webhook signature mismatch");
            return Err(WebhookError::Signature);
        }

        if let Some(value) = adapter.timestamp_header().and_then(|name| headers.get(name)) {
            let claimed = parse_timestamp_header(value).ok_or(WebhookError::Replay)?;
            if !is_fresh(Some(claimed), self.clock.now().as_i64(), self.replay_window_secs) {
                tracing::warn!(claimed, "webhook timestamp outside replay window");
                return Err(WebhookError::Replay);
            }
        }
        Ok(())
    }
}

fn ledger_update(provider: Provider, parsed: &ParsedWebhook, raw_body: &[u8]) -> SessionUpdate {
    SessionUpdate::new(provider, parsed.provider_session_id.clone())
        .user(parsed.user_id.clone())
        .url(Some(parsed.session_url.clone().unwrap_or_default()))
        .status(parsed.raw_status.clone())
        .payload(Some(String::from_utf8_lossy(raw_body).into_owned()))
}
