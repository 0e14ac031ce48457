//! Service configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use idv_providers::{didit, veriff, ProviderSettings};
use idv_types::Provider;

use crate::NodeError;

const DIDIT_CALLBACK: &str = "rooverse://verification/callback";
const VERIFF_CALLBACK: &str = "https://veriff.com";

/// Configuration for the verification service.
///
/// Loaded from a TOML file via [`ServiceConfig::from_toml_file`] or built
/// programmatically (e.g. for tests). Secrets are normally supplied through
/// the environment by the daemon rather than written to the file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Port for the HTTP server.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Data directory for the LMDB environment.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// LMDB map size in bytes.
    #[serde(default = "default_map_size")]
    pub map_size: usize,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Maximum accepted clock skew for timestamped webhooks.
    #[serde(default = "default_replay_window")]
    pub replay_window_secs: u64,

    #[serde(default)]
    pub didit: ProviderSettings,

    #[serde(default)]
    pub veriff: ProviderSettings,

    #[serde(default)]
    pub push: PushConfig,
}

/// Push notification delivery.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PushConfig {
    /// FCM legacy server key. Push is disabled when absent.
    #[serde(default)]
    pub fcm_server_key: Option<String>,

    #[serde(default = "default_fcm_endpoint")]
    pub fcm_endpoint: String,

    /// Android notification channel.
    #[serde(default = "default_channel_id")]
    pub channel_id: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_port() -> u16 {
    8080
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./idv_data")
}

fn default_map_size() -> usize {
    idv_store_lmdb::DEFAULT_MAP_SIZE
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_replay_window() -> u64 {
    idv_crypto::REPLAY_WINDOW_SECS
}

fn default_fcm_endpoint() -> String {
    idv_notify::FCM_LEGACY_ENDPOINT.to_string()
}

fn default_channel_id() -> String {
    "rooverse_wallet".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl ServiceConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, NodeError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| NodeError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, NodeError> {
        toml::to_string_pretty(self).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Settings for one provider with built-in endpoints and callbacks
    /// filled in where the file left them empty.
    pub fn provider_settings(&self, provider: Provider) -> ProviderSettings {
        let (mut settings, base_url, callback) = match provider {
            Provider::Didit => (self.didit.clone(), didit::DEFAULT_BASE_URL, DIDIT_CALLBACK),
            Provider::Veriff => (self.veriff.clone(), veriff::DEFAULT_BASE_URL, VERIFF_CALLBACK),
        };
        if settings.base_url.is_empty() {
            settings.base_url = base_url.to_string();
        }
        if settings.callback_url.is_empty() {
            settings.callback_url = callback.to_string();
        }
        settings
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            data_dir: default_data_dir(),
            map_size: default_map_size(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            replay_window_secs: default_replay_window(),
            didit: ProviderSettings::default(),
            veriff: ProviderSettings::default(),
            push: PushConfig::default(),
        }
    }
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            fcm_server_key: None,
            fcm_endpoint: default_fcm_endpoint(),
            channel_id: default_channel_id(),
        }
    }
}
