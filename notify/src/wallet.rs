//! Wallet event notifications, sent by the app after a transfer or tip.

use idv_types::UserId;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::{NotifyError, PushMessage};

pub const DEFAULT_WALLET_EVENT: &str = "roo_received";

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletNotification {
    #[serde(default)]
    pub recipient_user_id: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub data: Option<Map<String, Value>>,
}

impl WalletNotification {
    /// Validate and turn into a recipient plus message.
    ///
    /// `data.type` defaults to the event kind; keys in `data` win over it.
    pub fn into_message(self) -> Result<(UserId, PushMessage), NotifyError> {
        let recipient = non_empty(self.recipient_user_id).ok_or(NotifyError::MissingFields)?;
        let title = non_empty(self.title).ok_or(NotifyError::MissingFields)?;
        let body = non_empty(self.body).ok_or(NotifyError::MissingFields)?;
        let recipient = UserId::new(recipient).map_err(|_| NotifyError::MissingFields)?;

        let mut message = PushMessage::new(title, body).with_data(
            "type",
            self.kind.unwrap_or_else(|| DEFAULT_WALLET_EVENT.to_string()),
        );
        for (key, value) in self.data.unwrap_or_default() {
            let value = match value {
                Value::String(s) => s,
                other => other.to_string(),
            };
            message.data.insert(key, value);
        }
        Ok((recipient, message))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> WalletNotification {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn defaults_event_type() {
        let (user, msg) = parse(r#"{"recipientUserId":"u1","title":"T","body":"B"}"#)
            .into_message()
            .unwrap();
        assert_eq!(user.as_str(), "u1");
        assert_eq!(msg.data["type"], "roo_received");
    }

    #[test]
    fn data_is_stringified_and_overrides_type() {
        let (_, msg) = parse(
            r#"{"recipientUserId":"u1","type":"tip","title":"T","body":"B",
                "data":{"amount":5,"type":"custom","memo":"hi"}}"#,
        )
        .into_message()
        .unwrap();
        assert_eq!(msg.data["type"], "custom");
        assert_eq!(msg.data["amount"], "5");
        assert_eq!(msg.data["memo"], "hi");
    }

    #[test]
    fn missing_fields_rejected() {
        for json in [
            r#"{"title":"T","body":"B"}"#,
            r#"{"recipientUserId":"u1","body":"B"}"#,
            r#"{"recipientUserId":"u1","title":"T","body":""}"#,
        ] {
            assert!(matches!(
                parse(json).into_message(),
                Err(NotifyError::MissingFields)
            ));
        }
    }
}
