//! Push message contents.

use std::collections::BTreeMap;

use idv_types::{CanonicalStatus, Provider};

/// One notification addressed to a set of device tokens.
///
/// FCM only accepts string values in the data map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PushMessage {
    pub tokens: Vec<String>,
    pub title: String,
    pub body: String,
    pub data: BTreeMap<String, String>,
    /// Android channel; the sender's default applies when unset.
    pub channel_id: Option<String>,
}

impl PushMessage {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            tokens: Vec::new(),
            title: title.into(),
            body: body.into(),
            data: BTreeMap::new(),
            channel_id: None,
        }
    }

    pub fn on_channel(mut self, channel_id: impl Into<String>) -> Self {
        self.channel_id = Some(channel_id.into());
        self
    }

    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn to_tokens(mut self, tokens: Vec<String>) -> Self {
        self.tokens = tokens;
        self
    }
}

/// The message sent to a user when a provider reaches a final decision.
/// Non-terminal statuses produce nothing.
pub fn verification_message(
    provider: Provider,
    status: CanonicalStatus,
    detail: Option<&str>,
) -> Option<PushMessage> {
    let message = match status {
        CanonicalStatus::Approved => PushMessage::new(
            "Verification approved",
            "Your identity has been verified.",
        ),
        CanonicalStatus::Declined => PushMessage::new(
            "Verification declined",
            format!(
                "Your identity verification was declined: {}",
                detail.unwrap_or("Declined")
            ),
        ),
        CanonicalStatus::Pending(_) => return None,
    };
    Some(
        message
            .with_data("type", "verification_result")
            .with_data("provider", provider.as_str())
            .with_data("status", status.as_str()),
    )
}
