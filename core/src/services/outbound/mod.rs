//! Outbound collaborator traits: notification dispatch and event publishing.
//!
//! Both are best-effort side effects. Command handlers log failures and
//! carry on; a lost email or event never fails the triggering operation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::DomainResult;

/// Delivers account lifecycle emails.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Sends the activation email carrying the raw reset token and its expiry.
    async fn send_activation_email(
        &self,
        to: &str,
        display_name: Option<&str>,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> DomainResult<()>;

    /// Confirms a completed password change.
    async fn send_password_changed_email(
        &self,
        to: &str,
        display_name: Option<&str>,
    ) -> DomainResult<()>;
}

/// Publishes account lifecycle events to the rest of the platform.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish_account_created(&self, account_id: Uuid, email: &str) -> DomainResult<()>;
}

/// Dispatcher that drops every message. Useful in tests and local setups.
pub struct NoopNotificationDispatcher;

#[async_trait]
impl NotificationDispatcher for NoopNotificationDispatcher {
    async fn send_activation_email(
        &self,
        to: &str,
        _display_name: Option<&str>,
        _token: &str,
        _expires_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        tracing::debug!(to, "activation email suppressed (noop dispatcher)");
        Ok(())
    }

    async fn send_password_changed_email(
        &self,
        to: &str,
        _display_name: Option<&str>,
    ) -> DomainResult<()> {
        tracing::debug!(to, "password-changed email suppressed (noop dispatcher)");
        Ok(())
    }
}

/// Publisher that drops every event.
pub struct NoopEventPublisher;

#[async_trait]
impl EventPublisher for NoopEventPublisher {
    async fn publish_account_created(&self, account_id: Uuid, email: &str) -> DomainResult<()> {
        tracing::debug!(%account_id, email, "account-created event suppressed (noop publisher)");
        Ok(())
    }
}
