//! Span constructors shared by the inbound paths.

use idv_types::{Provider, UserId};
use tracing::{info_span, Span};

/// Span covering one inbound webhook, from authentication to acknowledgement.
pub fn webhook_span(provider: Provider) -> Span {
    info_span!("webhook", provider = %provider, session = tracing::field::Empty)
}

/// Span covering one session-creation request.
pub fn session_create_span(provider: Provider, user_id: &UserId) -> Span {
    info_span!("session_create", provider = %provider, user = %user_id)
}
