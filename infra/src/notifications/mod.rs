//! Notification delivery implementations.

pub mod outbox_mailer;

pub use outbox_mailer::OutboxMailer;
