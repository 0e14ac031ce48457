//! Verification sessions: the provider-side audit trail.
//!
//! A session is keyed by `(provider, provider_session_id)`. It is written by
//! session creation and by every webhook, in either order, and is never read
//! by business logic.

use serde::{Deserialize, Serialize};

use crate::{Provider, ProviderSessionId, Timestamp, UserId};

/// One verification session as recorded in the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationSession {
    pub provider: Provider,
    pub provider_session_id: ProviderSessionId,
    pub user_id: Option<UserId>,
    /// Never absent: an early webhook records an empty URL.
    pub session_url: String,
    pub session_token: Option<String>,
    pub raw_status: String,
    /// Latest full webhook body (JSON text).
    pub last_payload: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Partial knowledge about a session.
///
/// `Some` fields overwrite, `None` fields preserve whatever is stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUpdate {
    pub provider: Provider,
    pub provider_session_id: ProviderSessionId,
    pub user_id: Option<UserId>,
    pub session_url: Option<String>,
    pub session_token: Option<String>,
    pub raw_status: Option<String>,
    pub last_payload: Option<String>,
}

impl SessionUpdate {
    /// An update that carries only the key.
    pub fn new(provider: Provider, provider_session_id: ProviderSessionId) -> Self {
        Self {
            provider,
            provider_session_id,
            user_id: None,
            session_url: None,
            session_token: None,
            raw_status: None,
            last_payload: None,
        }
    }

    pub fn user(mut self, user_id: Option<UserId>) -> Self {
        self.user_id = user_id;
        self
    }

    pub fn url(mut self, url: Option<String>) -> Self {
        self.session_url = url;
        self
    }

    pub fn token(mut self, token: Option<String>) -> Self {
        self.session_token = token;
        self
    }

    pub fn status(mut self, raw_status: impl Into<String>) -> Self {
        self.raw_status = Some(raw_status.into());
        self
    }

    pub fn payload(mut self, payload: Option<String>) -> Self {
        self.last_payload = payload;
        self
    }
}

impl VerificationSession {
    /// Create the row from the first update seen for this key.
    pub fn create(update: &SessionUpdate, now: Timestamp) -> Self {
        Self {
            provider: update.provider,
            provider_session_id: update.provider_session_id.clone(),
            user_id: update.user_id.clone(),
            session_url: update.session_url.clone().unwrap_or_default(),
            session_token: update.session_token.clone(),
            raw_status: update.raw_status.clone().unwrap_or_default(),
            last_payload: update.last_payload.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge a later update into an existing row.
    ///
    /// An empty URL never replaces a known one: webhooks that omit the URL
    /// report it as empty.
    pub fn merge(&mut self, update: &SessionUpdate, now: Timestamp) {
        if let Some(user_id) = &update.user_id {
            self.user_id = Some(user_id.clone());
        }
        if let Some(url) = update.session_url.as_ref().filter(|u| !u.is_empty()) {
            self.session_url = url.clone();
        }
        if let Some(token) = &update.session_token {
            self.session_token = Some(token.clone());
        }
        if let Some(status) = &update.raw_status {
            self.raw_status = status.clone();
        }
        if let Some(payload) = &update.last_payload {
            self.last_payload = Some(payload.clone());
        }
        self.updated_at = now;
    }

    /// Create-or-merge, the single rule every store backend applies.
    pub fn upsert(existing: Option<Self>, update: &SessionUpdate, now: Timestamp) -> Self {
        match existing {
            Some(mut session) => {
                session.merge(update, now);
                session
            }
            None => Self::create(update, now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> SessionUpdate {
        SessionUpdate::new(Provider::Didit, ProviderSessionId::new("s1").unwrap())
    }

    #[test]
    fn create_defaults_url_to_empty() {
        let s = VerificationSession::create(&key().status("Approved"), Timestamp::new(5));
        assert_eq!(s.session_url, "");
        assert_eq!(s.raw_status, "Approved");
        assert_eq!(s.created_at, Timestamp::new(5));
        assert!(s.user_id.is_none());
    }

    #[test]
    fn merge_preserves_absent_fields() {
        let created = key()
            .user(Some(UserId::new("u1").unwrap()))
            .url(Some("https://x".into()))
            .status("Not Started");
        let mut s = VerificationSession::create(&created, Timestamp::new(1));

        s.merge(&key().status("Approved").url(Some(String::new())), Timestamp::new(9));

        assert_eq!(s.user_id.as_ref().map(UserId::as_str), Some("u1"));
        assert_eq!(s.session_url, "https://x");
        assert_eq!(s.raw_status, "Approved");
        assert_eq!(s.created_at, Timestamp::new(1));
        assert_eq!(s.updated_at, Timestamp::new(9));
    }

    #[test]
    fn late_creation_fills_in_url_after_webhook() {
        let early = VerificationSession::create(&key().status("In Review"), Timestamp::new(1));
        let merged = VerificationSession::upsert(
            Some(early),
            &key()
                .user(Some(UserId::new("u1").unwrap()))
                .url(Some("https://x".into())),
            Timestamp::new(2),
        );
        assert_eq!(merged.session_url, "https://x");
        assert_eq!(merged.raw_status, "In Review");
    }
}
