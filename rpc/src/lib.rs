//! HTTP server for the identity-verification service.
//!
//! Provides endpoints for:
//! - Provider webhooks and app session requests (`/didit`, `/veriff`)
//! - Wallet and direct-message pushes (`/notify-wallet`, `/notify-dm`)
//! - Account provisioning: profile, device tokens, thread membership
//!   (`/profile`, `/devices`, `/dm-threads`)
//! - Liveness (`/health`) and Prometheus metrics (`/metrics`)

pub mod auth;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod server;

pub use auth::{Authenticator, GatewayJwtAuthenticator};
pub use error::RpcError;
pub use metrics::ServiceMetrics;
pub use server::{router, AppState, RpcServer};
