//! Prometheus metrics for the verification service.
//!
//! [`ServiceMetrics`] owns a dedicated [`Registry`] that the `/metrics`
//! endpoint encodes into the Prometheus text exposition format.

use prometheus::{register_int_counter_with_registry, Encoder, IntCounter, Opts, Registry, TextEncoder};

pub struct ServiceMetrics {
    pub registry: Registry,

    /// Webhooks that reached the engine.
    pub webhooks_received: IntCounter,
    /// Webhooks refused at the authentication gate or for missing config.
    pub webhooks_rejected: IntCounter,
    /// Webhooks reconciled against a known user.
    pub webhooks_processed: IntCounter,
    /// Authentic webhooks that were acknowledged without reconciliation.
    pub webhooks_skipped: IntCounter,
    pub sessions_created: IntCounter,
    pub session_failures: IntCounter,
    pub push_sent: IntCounter,
    pub push_failures: IntCounter,
}

fn counter(registry: &Registry, name: &str, help: &str) -> IntCounter {
    register_int_counter_with_registry!(Opts::new(name, help), registry)
        .unwrap_or_else(|e| panic!("failed to register {name}: {e}"))
}

impl ServiceMetrics {
    pub fn new() -> Self {
        let registry = Registry::new();
        Self {
            webhooks_received: counter(
                &registry,
                "idv_webhooks_received_total",
                "Total provider webhooks received",
            ),
            webhooks_rejected: counter(
                &registry,
                "idv_webhooks_rejected_total",
                "Webhooks rejected by signature, replay or configuration checks",
            ),
            webhooks_processed: counter(
                &registry,
                "idv_webhooks_processed_total",
                "Webhooks reconciled against a user",
            ),
            webhooks_skipped: counter(
                &registry,
                "idv_webhooks_skipped_total",
                "Webhooks acknowledged without reconciliation",
            ),
            sessions_created: counter(
                &registry,
                "idv_sessions_created_total",
                "Verification sessions created with a provider",
            ),
            session_failures: counter(
                &registry,
                "idv_session_failures_total",
                "Failed session creation requests",
            ),
            push_sent: counter(&registry, "idv_push_sent_total", "Push notifications sent"),
            push_failures: counter(
                &registry,
                "idv_push_failures_total",
                "Push notifications that failed to send",
            ),
            registry,
        }
    }

    /// Render every metric in the text exposition format.
    pub fn encode(&self) -> String {
        let mut buffer = Vec::new();
        if let Err(e) = TextEncoder::new().encode(&self.registry.gather(), &mut buffer) {
            tracing::warn!(error = %e, "failed to encode metrics");
        }
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self::new()
    }
}
