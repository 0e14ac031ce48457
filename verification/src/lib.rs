//! Identity-verification workflow.
//!
//! Two inbound paths share this crate:
//! 1. **Session creation**: the app asks for a session, the provider returns
//!    a URL, and the ledger records it ([`SessionInitiator`]).
//! 2. **Decision webhooks**: the provider reports progress. The body is
//!    authenticated, recorded in the ledger, and terminal outcomes are
//!    reconciled into the user's verification record and profile
//!    ([`WebhookEngine`]).
//!
//! The ledger and the records are independent: either can fail without
//! blocking the other.

pub mod accounts;
pub mod engine;
pub mod error;
pub mod headers;
pub mod initiator;
pub mod ledger;
pub mod reconciler;
pub mod spans;

pub use accounts::AccountDirectory;
pub use engine::{ProviderBinding, WebhookAck, WebhookEngine};
pub use error::{VerificationError, WebhookError};
pub use headers::WebhookHeaders;
pub use initiator::SessionInitiator;
pub use ledger::SessionLedger;
pub use reconciler::{ReconcileReport, RecordReconciler};
