//! HTTP middleware: authentication resolution and CORS.

pub mod auth;
pub mod cors;
