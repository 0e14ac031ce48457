//! Nullable infrastructure for deterministic testing.
//!
//! Every external dependency of the verification service (clock, storage,
//! provider API, push delivery) sits behind a trait. This crate provides
//! test implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod clock;
pub mod network;
pub mod push;
pub mod store;

pub use clock::NullClock;
pub use network::NullProviderApi;
pub use push::NullPushSender;
pub use store::NullStore;
