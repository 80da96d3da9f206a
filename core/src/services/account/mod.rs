//! Account command service: sign-in, credential changes, invitations and
//! single-use token redemption.

pub mod config;
mod invite;
pub mod service;

pub use config::AccountServiceConfig;
pub use service::AccountService;

#[cfg(test)]
mod tests;
