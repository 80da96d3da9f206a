//! Shared wiring for API integration tests.

use std::sync::Arc;

use actix_web::web;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use iam_api::app::AppState;
use iam_core::errors::DomainResult;
use iam_core::repositories::InMemoryAccountRepository;
use iam_core::services::account::{AccountService, AccountServiceConfig};
use iam_core::services::hashing::BcryptPasswordHasher;
use iam_core::services::outbound::{NoopEventPublisher, NotificationDispatcher};
use iam_core::services::session::{SessionTokenConfig, SessionTokenService};

/// Dispatcher capturing activation tokens so tests can redeem them.
#[derive(Default)]
pub struct CapturingMailer {
    pub activation_tokens: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl NotificationDispatcher for CapturingMailer {
    async fn send_activation_email(
        &self,
        to: &str,
        _display_name: Option<&str>,
        token: &str,
        _expires_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.activation_tokens.lock().await.push((to.to_string(), token.to_string()));
        Ok(())
    }

    async fn send_password_changed_email(
        &self,
        _to: &str,
        _display_name: Option<&str>,
    ) -> DomainResult<()> {
        Ok(())
    }
}

pub type TestAppState =
    AppState<InMemoryAccountRepository, BcryptPasswordHasher, CapturingMailer, NoopEventPublisher>;

pub struct TestContext {
    pub state: web::Data<TestAppState>,
    pub mailer: Arc<CapturingMailer>,
    pub service: Arc<
        AccountService<
            InMemoryAccountRepository,
            BcryptPasswordHasher,
            CapturingMailer,
            NoopEventPublisher,
        >,
    >,
}

impl TestContext {
    pub async fn last_activation_token(&self) -> String {
        self.mailer
            .activation_tokens
            .lock()
            .await
            .last()
            .map(|(_, token)| token.clone())
            .expect("an activation email should have been captured")
    }
}

pub fn context() -> TestContext {
    let accounts = Arc::new(InMemoryAccountRepository::new());
    let sessions = Arc::new(SessionTokenService::new(SessionTokenConfig::new("test-secret")));
    let mailer = Arc::new(CapturingMailer::default());
    let service = Arc::new(AccountService::new(
        Arc::clone(&accounts),
        Arc::new(BcryptPasswordHasher::with_cost(4)),
        Arc::clone(&sessions),
        Arc::clone(&mailer),
        Arc::new(NoopEventPublisher),
        AccountServiceConfig::default(),
    ));

    let state = web::Data::new(AppState {
        accounts,
        account_service: Arc::clone(&service),
        sessions,
    });

    TestContext { state, mailer, service }
}
