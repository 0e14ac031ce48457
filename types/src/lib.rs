//! Fundamental types for identity-verification session reconciliation.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! identifiers, providers, timestamps, canonical statuses, and the durable
//! session / verification-record / profile shapes.

pub mod error;
pub mod id;
pub mod profile;
pub mod provider;
pub mod record;
pub mod session;
pub mod status;
pub mod time;

pub use error::IdvError;
pub use id::{ProviderSessionId, ThreadId, UserId};
pub use profile::{AccountStatus, HumanVerification, ProfileChange, UserProfile};
pub use provider::Provider;
pub use record::{RecordStatus, VerificationMethod, VerificationRecord};
pub use session::{SessionUpdate, VerificationSession};
pub use status::{CanonicalStatus, PendingKind};
pub use time::{Clock, SystemClock, Timestamp};
