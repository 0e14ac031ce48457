//! Direct-message notifications.
//!
//! The messaging database posts every inserted message row here. Everyone
//! in the thread except the sender gets one multicast push titled with the
//! sender's name.

use std::sync::Arc;

use idv_store::{ProfileStore, ThreadStore};
use idv_types::{ThreadId, UserId, UserProfile};
use serde::Deserialize;
use serde_json::Value;

use crate::{Notifier, NotifyError, NotifyOutcome, PushMessage};

pub const DM_EVENT: &str = "message";
pub const DM_CHANNEL_ID: &str = "rooverse_messages";

const PREVIEW_CHARS: usize = 100;
const ANONYMOUS_SENDER: &str = "Someone";

/// Database-webhook envelope: `{ type, table, record, old_record }`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct MessageInserted {
    #[serde(default)]
    pub record: Option<MessageRecord>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct MessageRecord {
    #[serde(default)]
    pub thread_id: Option<String>,
    #[serde(default)]
    pub sender_id: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub ai_score_status: Option<String>,
}

impl MessageRecord {
    pub fn is_flagged(&self) -> bool {
        self.ai_score_status.as_deref() == Some("flagged")
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum DirectMessageOutcome {
    /// Moderation flagged the message; nobody is notified.
    Flagged,
    NoRecipients,
    NoTokens,
    Sent { devices: usize, response: Value },
}

/// Notification body: a media placeholder, or the text cut at 100 characters.
pub fn message_preview(media_type: Option<&str>, body: &str) -> String {
    match media_type {
        Some("image") => "📷 Photo".to_string(),
        Some("video") => "🎥 Video".to_string(),
        Some("document") => "📎 Document".to_string(),
        Some("audio") => "🎤 Voice message".to_string(),
        _ if body.chars().count() > PREVIEW_CHARS => {
            let mut preview: String = body.chars().take(PREVIEW_CHARS).collect();
            preview.push('…');
            preview
        }
        _ => body.to_string(),
    }
}

/// Display name, then username, then a generic placeholder.
pub fn sender_title(profile: Option<&UserProfile>) -> String {
    let display_name = profile
        .and_then(|p| p.display_name.as_deref())
        .map(str::trim)
        .filter(|n| !n.is_empty());
    let username = profile
        .and_then(|p| p.username.as_deref())
        .filter(|n| !n.is_empty());
    display_name
        .or(username)
        .unwrap_or(ANONYMOUS_SENDER)
        .to_string()
}

#[derive(Clone)]
pub struct DirectMessageNotifier {
    threads: Arc<dyn ThreadStore + Send + Sync>,
    profiles: Arc<dyn ProfileStore + Send + Sync>,
    notifier: Notifier,
}

impl DirectMessageNotifier {
    pub fn new(
        threads: Arc<dyn ThreadStore + Send + Sync>,
        profiles: Arc<dyn ProfileStore + Send + Sync>,
        notifier: Notifier,
    ) -> Self {
        Self {
            threads,
            profiles,
            notifier,
        }
    }

    pub async fn dispatch(&self, record: MessageRecord) -> Result<DirectMessageOutcome, NotifyError> {
        if record.is_flagged() {
            tracing::info!(thread = ?record.thread_id, "skipping flagged message");
            return Ok(DirectMessageOutcome::Flagged);
        }
        let thread_id = record
            .thread_id
            .as_deref()
            .and_then(|t| ThreadId::new(t).ok())
            .ok_or(NotifyError::MissingFields)?;
        let sender_id = record
            .sender_id
            .as_deref()
            .and_then(|s| UserId::new(s).ok())
            .ok_or(NotifyError::MissingFields)?;

        let recipients: Vec<UserId> = match self.threads.participants(&thread_id) {
            Ok(members) => members.into_iter().filter(|m| *m != sender_id).collect(),
            Err(e) => {
                tracing::warn!(thread = %thread_id, error = %e, "participant lookup failed");
                Vec::new()
            }
        };
        if recipients.is_empty() {
            return Ok(DirectMessageOutcome::NoRecipients);
        }

        let sender_profile = self.profiles.get_profile(&sender_id).unwrap_or_else(|e| {
            tracing::warn!(sender = %sender_id, error = %e, "sender profile lookup failed");
            None
        });
        let message = PushMessage::new(
            sender_title(sender_profile.as_ref()),
            message_preview(
                record.media_type.as_deref(),
                record.body.as_deref().unwrap_or_default(),
            ),
        )
        .with_data("type", DM_EVENT)
        .with_data("thread_id", thread_id.as_str())
        .with_data("sender_id", sender_id.as_str())
        .on_channel(DM_CHANNEL_ID);

        Ok(match self.notifier.send_to_users(&recipients, message).await? {
            NotifyOutcome::NoTokens => DirectMessageOutcome::NoTokens,
            NotifyOutcome::Sent { devices, response } => {
                DirectMessageOutcome::Sent { devices, response }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_types_get_placeholders() {
        assert_eq!(message_preview(Some("image"), "ignored"), "📷 Photo");
        assert_eq!(message_preview(Some("video"), ""), "🎥 Video");
        assert_eq!(message_preview(Some("document"), ""), "📎 Document");
        assert_eq!(message_preview(Some("audio"), ""), "🎤 Voice message");
        assert_eq!(message_preview(Some("sticker"), "hey"), "hey");
    }

    #[test]
    fn long_text_is_cut_at_one_hundred_chars() {
        let exact = "x".repeat(100);
        assert_eq!(message_preview(None, &exact), exact);

        let long = "é".repeat(150);
        let preview = message_preview(None, &long);
        assert_eq!(preview.chars().count(), 101);
        assert!(preview.ends_with("é…"));
    }

    #[test]
    fn sender_title_fallbacks() {
        let mut profile = UserProfile::new(UserId::new("s").unwrap());
        assert_eq!(sender_title(None), "Someone");
        assert_eq!(sender_title(Some(&profile)), "Someone");

        profile.username = Some("ada99".into());
        profile.display_name = Some("   ".into());
        assert_eq!(sender_title(Some(&profile)), "ada99");

        profile.display_name = Some(" Ada ".into());
        assert_eq!(sender_title(Some(&profile)), "Ada");
    }

    #[test]
    fn envelope_parses_database_webhook() {
        let event: MessageInserted = serde_json::from_str(
            r#"{"type":"INSERT","table":"dm_messages","record":{
                "thread_id":"t1","sender_id":"u1","body":"hi","media_type":null,
                "ai_score_status":"flagged"},"old_record":null}"#,
        )
        .unwrap();
        let record = event.record.unwrap();
        assert!(record.is_flagged());
        assert_eq!(record.thread_id.as_deref(), Some("t1"));
        assert!(record.media_type.is_none());
    }
}
