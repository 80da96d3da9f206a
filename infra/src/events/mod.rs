//! Platform event publishing implementations.

pub mod webhook_publisher;

pub use webhook_publisher::WebhookEventPublisher;
