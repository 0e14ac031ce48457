//! Token lookup plus delivery.

use std::sync::Arc;

use async_trait::async_trait;
use idv_store::DeviceTokenStore;
use idv_types::UserId;
use serde_json::Value;

use crate::{NotifyError, PushMessage};

/// Delivers one message to the tokens it carries.
#[async_trait]
pub trait PushSender: Send + Sync {
    /// Returns the push service's response body.
    async fn send(&self, message: &PushMessage) -> Result<Value, NotifyError>;
}

#[derive(Clone, Debug, PartialEq)]
pub enum NotifyOutcome {
    /// The user has no registered devices; nothing was sent.
    NoTokens,
    Sent { devices: usize, response: Value },
}

#[derive(Clone)]
pub struct Notifier {
    tokens: Arc<dyn DeviceTokenStore + Send + Sync>,
    sender: Arc<dyn PushSender>,
}

impl Notifier {
    pub fn new(
        tokens: Arc<dyn DeviceTokenStore + Send + Sync>,
        sender: Arc<dyn PushSender>,
    ) -> Self {
        Self { tokens, sender }
    }

    /// Send `message` to every device registered for `user_id`.
    pub async fn send_to_user(
        &self,
        user_id: &UserId,
        message: PushMessage,
    ) -> Result<NotifyOutcome, NotifyError> {
        self.send_to_users(std::slice::from_ref(user_id), message).await
    }

    /// One multicast covering every device of every listed user.
    pub async fn send_to_users(
        &self,
        user_ids: &[UserId],
        message: PushMessage,
    ) -> Result<NotifyOutcome, NotifyError> {
        let mut tokens = Vec::new();
        for user_id in user_ids {
            for token in self.tokens.tokens_for(user_id)? {
                if !tokens.contains(&token) {
                    tokens.push(token);
                }
            }
        }
        if tokens.is_empty() {
            tracing::debug!(users = user_ids.len(), "no device tokens registered");
            return Ok(NotifyOutcome::NoTokens);
        }
        let devices = tokens.len();
        let response = self.sender.send(&message.to_tokens(tokens)).await?;
        tracing::info!(users = user_ids.len(), devices, "push sent");
        Ok(NotifyOutcome::Sent { devices, response })
    }

    /// Fire-and-forget variant: failures are logged and dropped.
    pub async fn notify_user(&self, user_id: &UserId, message: PushMessage) -> bool {
        match self.send_to_user(user_id, message).await {
            Ok(NotifyOutcome::Sent { .. }) => true,
            Ok(NotifyOutcome::NoTokens) => false,
            Err(e) => {
                tracing::warn!(user = %user_id, error = %e, "push notification failed");
                false
            }
        }
    }
}
