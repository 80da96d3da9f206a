//! Authentication endpoints: sign-in and token-based password reset.

pub mod reset_password;
pub mod sign_in;
