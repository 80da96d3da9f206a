//! Repository abstractions over durable storage.

pub mod account;

pub use account::{AccountRepository, InMemoryAccountRepository};
