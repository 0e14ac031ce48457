//! The verification service: wires configuration, storage and the
//! workflow components together and runs the HTTP server.

use std::collections::HashMap;
use std::sync::Arc;

use idv_notify::{DirectMessageNotifier, FcmSender, Notifier, PushSender};
use idv_providers::{adapter_for, HttpProviderApi, ProviderAdapter, ProviderApi};
use idv_rpc::{AppState, GatewayJwtAuthenticator, RpcServer, ServiceMetrics};
use idv_store::IdvStore;
use idv_store_lmdb::LmdbStore;
use idv_types::{Clock, Provider, SystemClock};
use idv_verification::{
    AccountDirectory, ProviderBinding, RecordReconciler, SessionInitiator, SessionLedger, WebhookEngine,
};

use crate::{NodeError, ServiceConfig, ShutdownController};

/// External collaborators the service runs against.
///
/// Production uses LMDB, the system clock, `reqwest` and FCM; tests swap in
/// nullables.
pub struct Infrastructure<S> {
    pub store: Arc<S>,
    pub clock: Arc<dyn Clock>,
    pub provider_api: Arc<dyn ProviderApi>,
    /// `None` disables push notifications.
    pub push: Option<Arc<dyn PushSender>>,
}

/// Build the shared request state from configuration and infrastructure.
pub fn assemble<S: IdvStore + 'static>(config: &ServiceConfig, infra: Infrastructure<S>) -> AppState {
    let ledger = SessionLedger::new(infra.store.clone(), infra.clock.clone());
    let reconciler = RecordReconciler::new(infra.store.clone(), infra.clock.clone());
    let notifier = infra
        .push
        .map(|sender| Notifier::new(infra.store.clone(), sender));

    let direct_messages = notifier.as_ref().map(|notifier| {
        DirectMessageNotifier::new(infra.store.clone(), infra.store.clone(), notifier.clone())
    });
    let accounts = AccountDirectory::new(infra.store.clone());

    let mut engine = WebhookEngine::new(ledger.clone(), reconciler, infra.clock.clone())
        .with_replay_window(config.replay_window_secs);
    if let Some(notifier) = &notifier {
        engine = engine.with_notifier(notifier.clone());
    }

    let mut initiators = HashMap::new();
    for provider in Provider::ALL {
        let settings = config.provider_settings(provider);
        if settings.webhook_secret().is_none() {
            tracing::warn!(%provider, "no webhook secret configured, webhooks will be refused");
        }
        if settings.api_key().is_none() {
            tracing::warn!(%provider, "no API key configured, session creation will fail");
        }

        let adapter: Arc<dyn ProviderAdapter> = Arc::from(adapter_for(provider, &settings));
        engine = engine.with_provider(ProviderBinding::new(
            adapter.clone(),
            settings.webhook_secret.clone(),
        ));
        initiators.insert(
            provider,
            SessionInitiator::new(adapter, settings, infra.provider_api.clone(), ledger.clone()),
        );
    }

    AppState {
        engine,
        initiators,
        accounts,
        authenticator: Arc::new(GatewayJwtAuthenticator),
        notifier,
        direct_messages,
        metrics: Arc::new(ServiceMetrics::new()),
    }
}

pub struct VerificationService {
    config: ServiceConfig,
    state: Arc<AppState>,
}

impl VerificationService {
    /// Open storage and assemble the production service.
    pub fn open(config: ServiceConfig) -> Result<Self, NodeError> {
        let store = LmdbStore::open(&config.data_dir, config.map_size)?;
        tracing::info!(data_dir = %config.data_dir.display(), "store opened");

        let push = config
            .push
            .fcm_server_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .map(|key| {
                Arc::new(
                    FcmSender::new(key)
                        .with_endpoint(config.push.fcm_endpoint.clone())
                        .with_channel_id(config.push.channel_id.clone()),
                ) as Arc<dyn PushSender>
            });
        if push.is_none() {
            tracing::warn!("no FCM server key configured, push notifications disabled");
        }

        let state = assemble(
            &config,
            Infrastructure {
                store: Arc::new(store),
                clock: Arc::new(SystemClock),
                provider_api: Arc::new(HttpProviderApi::new()),
                push,
            },
        );
        Ok(Self {
            config,
            state: Arc::new(state),
        })
    }

    pub fn state(&self) -> Arc<AppState> {
        self.state.clone()
    }

    /// Serve until `shutdown` fires.
    pub async fn run(&self, shutdown: &ShutdownController) -> Result<(), NodeError> {
        let server = RpcServer::new(self.config.port, self.state.clone());
        server.start(shutdown.signalled()).await?;
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
