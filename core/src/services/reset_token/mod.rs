//! Single-use opaque reset/activation tokens.

pub mod service;

pub use service::{IssuedToken, ResetTokenService};
