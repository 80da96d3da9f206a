//! Domain services.

pub mod account;
pub mod hashing;
pub mod outbound;
pub mod reset_token;
pub mod session;

pub use account::AccountService;
pub use hashing::{BcryptPasswordHasher, PasswordHasher};
pub use reset_token::ResetTokenService;
pub use session::SessionTokenService;
