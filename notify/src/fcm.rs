//! Firebase Cloud Messaging sender (legacy HTTP API).

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::{NotifyError, PushMessage, PushSender};

pub const FCM_LEGACY_ENDPOINT: &str = "https://fcm.googleapis.com/fcm/send";

const DEFAULT_CHANNEL_ID: &str = "rooverse_wallet";

pub struct FcmSender {
    http_client: reqwest::Client,
    server_key: String,
    endpoint: String,
    channel_id: String,
}

impl FcmSender {
    pub fn new(server_key: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            server_key: server_key.into(),
            endpoint: FCM_LEGACY_ENDPOINT.to_string(),
            channel_id: DEFAULT_CHANNEL_ID.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_channel_id(mut self, channel_id: impl Into<String>) -> Self {
        self.channel_id = channel_id.into();
        self
    }

    /// Multicast payload in the legacy format.
    pub fn payload(&self, message: &PushMessage) -> Value {
        let channel_id = message.channel_id.as_deref().unwrap_or(&self.channel_id);
        json!({
            "registration_ids": message.tokens,
            "notification": {
                "title": message.title,
                "body": message.body,
                "sound": "default",
            },
            "data": message.data,
            "android": {
                "priority": "high",
                "notification": {
                    "channel_id": channel_id,
                    "sound": "default",
                },
            },
            "apns": {
                "payload": {
                    "aps": { "sound": "default", "badge": 1 },
                },
            },
        })
    }
}

#[async_trait]
impl PushSender for FcmSender {
    async fn send(&self, message: &PushMessage) -> Result<Value, NotifyError> {
        if self.server_key.is_empty() {
            return Err(NotifyError::Configuration("FCM server key".into()));
        }

        let response = self
            .http_client
            .post(&self.endpoint)
            .header(reqwest::header::AUTHORIZATION, format!("key={}", self.server_key))
            .json(&self.payload(message))
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| NotifyError::Transport(format!("failed to read FCM response: {e}")))?;
        if !status.is_success() {
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body: text,
            });
        }

        // The legacy endpoint answers JSON; anything else is passed through as text.
        Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
    }
}
