//! Identity-verification service node.
//!
//! Wires the verification workflow to its infrastructure:
//! - Loads [`ServiceConfig`] from TOML (the daemon overlays CLI/env values)
//! - Opens the LMDB store
//! - Builds provider adapters, the webhook engine and session initiators
//! - Runs the HTTP server until a shutdown signal arrives

pub mod config;
pub mod error;
pub mod logging;
pub mod service;
pub mod shutdown;

pub use config::{PushConfig, ServiceConfig};
pub use error::NodeError;
pub use logging::{init_logging, level_filter, LogFormat};
pub use service::{assemble, Infrastructure, VerificationService};
pub use shutdown::ShutdownController;
