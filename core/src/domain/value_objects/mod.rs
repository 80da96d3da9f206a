//! Value objects shared across the domain.

mod authenticated_account;

pub use authenticated_account::AuthenticatedAccount;
