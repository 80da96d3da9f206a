//! Webhook delivery of account lifecycle events.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use iam_core::errors::{DomainError, DomainResult};
use iam_core::services::outbound::EventPublisher;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Serialize)]
struct AccountCreatedEvent<'a> {
    event: &'static str,
    account_id: Uuid,
    email: &'a str,
    occurred_at: DateTime<Utc>,
}

/// Publishes events as JSON POSTs to a configured endpoint.
pub struct WebhookEventPublisher {
    client: reqwest::Client,
    endpoint: String,
}

impl WebhookEventPublisher {
    pub fn new(endpoint: impl Into<String>) -> DomainResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| DomainError::internal(format!("cannot build http client: {e}")))?;
        Ok(Self { client, endpoint: endpoint.into() })
    }
}

#[async_trait]
impl EventPublisher for WebhookEventPublisher {
    async fn publish_account_created(&self, account_id: Uuid, email: &str) -> DomainResult<()> {
        let event = AccountCreatedEvent {
            event: "account.created",
            account_id,
            email,
            occurred_at: Utc::now(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&event)
            .send()
            .await
            .map_err(|e| DomainError::internal(format!("event delivery failed: {e}")))?;

        if !response.status().is_success() {
            return Err(DomainError::internal(format!(
                "event endpoint answered {}",
                response.status()
            )));
        }

        tracing::debug!(%account_id, "account-created event delivered");
        Ok(())
    }
}
