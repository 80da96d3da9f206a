//! File-based mail outbox.
//!
//! Instead of talking to an SMTP relay directly, each message is written as
//! a JSON document into an outbox directory. A separate relay process picks
//! the files up and delivers them, so a slow or dead mail server can never
//! stall an account operation.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use iam_core::errors::{DomainError, DomainResult};
use iam_core::services::outbound::NotificationDispatcher;

/// A message file as written into the outbox directory.
#[derive(Debug, Serialize, Deserialize)]
pub struct OutboxMessage {
    pub id: Uuid,
    pub to: String,
    pub subject: String,
    pub body: String,
    pub queued_at: DateTime<Utc>,
}

/// Dispatcher writing mail as JSON files into an outbox directory.
pub struct OutboxMailer {
    outbox_dir: PathBuf,
    /// Base URL of the web frontend, used to build activation links.
    frontend_base_url: String,
}

impl OutboxMailer {
    pub fn new(outbox_dir: impl Into<PathBuf>, frontend_base_url: impl Into<String>) -> Self {
        let frontend_base_url = frontend_base_url.into();
        Self {
            outbox_dir: outbox_dir.into(),
            frontend_base_url: frontend_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn reset_link(&self, token: &str) -> String {
        format!("{}/reset-password?token={}", self.frontend_base_url, token)
    }

    async fn write_message(&self, message: OutboxMessage) -> DomainResult<()> {
        tokio::fs::create_dir_all(&self.outbox_dir)
            .await
            .map_err(|e| DomainError::internal(format!("cannot create outbox dir: {e}")))?;

        let filename = format!(
            "{}-{}.json",
            message.queued_at.format("%Y%m%dT%H%M%S%3f"),
            message.id
        );
        let path = self.outbox_dir.join(filename);
        let payload = serde_json::to_vec_pretty(&message)
            .map_err(|e| DomainError::internal(format!("cannot serialize mail: {e}")))?;

        tokio::fs::write(&path, payload)
            .await
            .map_err(|e| DomainError::internal(format!("cannot write outbox file: {e}")))?;

        tracing::info!(to = %message.to, path = %path.display(), "mail queued in outbox");
        Ok(())
    }
}

#[async_trait]
impl NotificationDispatcher for OutboxMailer {
    async fn send_activation_email(
        &self,
        to: &str,
        display_name: Option<&str>,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        let greeting = display_name.unwrap_or(to);
        let body = format!(
            "Hello {greeting},\n\n\
             An account has been prepared for you on the FleetOS platform.\n\
             Set your password here: {}\n\n\
             The link is valid until {} and can be used once.\n",
            self.reset_link(token),
            expires_at.format("%Y-%m-%d %H:%M UTC"),
        );
        self.write_message(OutboxMessage {
            id: Uuid::new_v4(),
            to: to.to_string(),
            subject: "Activate your FleetOS account".to_string(),
            body,
            queued_at: Utc::now(),
        })
        .await
    }

    async fn send_password_changed_email(
        &self,
        to: &str,
        display_name: Option<&str>,
    ) -> DomainResult<()> {
        let greeting = display_name.unwrap_or(to);
        let body = format!(
            "Hello {greeting},\n\n\
             The password of your FleetOS account was just changed.\n\
             If this was not you, contact your fleet administrator immediately.\n",
        );
        self.write_message(OutboxMessage {
            id: Uuid::new_v4(),
            to: to.to_string(),
            subject: "Your FleetOS password was changed".to_string(),
            body,
            queued_at: Utc::now(),
        })
        .await
    }
}
