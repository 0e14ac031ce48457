//! Cryptographic primitives for provider webhooks.
//!
//! - **HMAC-SHA256** over the raw request body, lowercase hex encoded, for
//!   webhook signature verification and outbound request signing
//! - **Replay guard** bounding how long a captured valid signature stays usable

pub mod replay;
pub mod signature;

pub use replay::{is_fresh, parse_timestamp_header, REPLAY_WINDOW_SECS};
pub use signature::{sign_hex, verify_signature};
