//! Domain entities.

pub mod account;
pub mod role;

pub use account::{Account, AccountStatus, AuditMetadata, Profile, ResetTokenBundle};
pub use role::RoleName;
