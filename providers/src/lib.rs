//! Identity-verification provider integrations.
//!
//! Each provider speaks the same protocol shape (create a session, let the
//! provider verify the user out-of-band, receive a signed decision webhook)
//! with its own payload layout. A [`ProviderAdapter`] translates one
//! provider's payloads into provider-agnostic types so a single engine can
//! drive both.
//!
//! The outbound HTTP call sits behind [`ProviderApi`] so tests can swap in a
//! canned transport.

pub mod adapter;
pub mod client;
pub mod didit;
pub mod error;
pub mod settings;
pub mod veriff;

pub use adapter::{
    adapter_for, MalformedPayload, ParsedWebhook, ProviderAdapter, SessionCreated,
    SessionRequest,
};
pub use client::{HttpProviderApi, OutboundRequest, ProviderApi, ProviderResponse};
pub use didit::DiditAdapter;
pub use error::ProviderError;
pub use settings::ProviderSettings;
pub use veriff::VeriffAdapter;
