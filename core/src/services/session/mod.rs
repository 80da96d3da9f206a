//! Short-lived signed session tokens.

pub mod config;
pub mod service;

pub use config::SessionTokenConfig;
pub use service::{SessionClaims, SessionTokenService};
