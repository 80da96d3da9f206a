//! Recording doubles and the shared service harness.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::commands::{AccountCommand, CommandOutcome};
use crate::domain::entities::{Account, Profile, RoleName};
use crate::errors::{DomainError, DomainResult};
use crate::repositories::{AccountRepository, InMemoryAccountRepository};
use crate::services::account::{AccountService, AccountServiceConfig};
use crate::services::hashing::BcryptPasswordHasher;
use crate::services::outbound::{EventPublisher, NotificationDispatcher};
use crate::services::session::{SessionTokenConfig, SessionTokenService};

/// A captured activation email, raw token included.
#[derive(Debug, Clone)]
pub struct ActivationMail {
    pub to: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Dispatcher that records every message instead of sending it.
#[derive(Default)]
pub struct RecordingNotifier {
    pub activations: Mutex<Vec<ActivationMail>>,
    pub password_changed: Mutex<Vec<String>>,
}

#[async_trait]
impl NotificationDispatcher for RecordingNotifier {
    async fn send_activation_email(
        &self,
        to: &str,
        _display_name: Option<&str>,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.activations.lock().await.push(ActivationMail {
            to: to.to_string(),
            token: token.to_string(),
            expires_at,
        });
        Ok(())
    }

    async fn send_password_changed_email(
        &self,
        to: &str,
        _display_name: Option<&str>,
    ) -> DomainResult<()> {
        self.password_changed.lock().await.push(to.to_string());
        Ok(())
    }
}

/// Publisher that records account-created events.
#[derive(Default)]
pub struct RecordingPublisher {
    pub created: Mutex<Vec<(Uuid, String)>>,
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish_account_created(&self, account_id: Uuid, email: &str) -> DomainResult<()> {
        self.created.lock().await.push((account_id, email.to_string()));
        Ok(())
    }
}

pub type TestService =
    AccountService<InMemoryAccountRepository, BcryptPasswordHasher, RecordingNotifier, RecordingPublisher>;

pub struct Harness {
    pub repo: Arc<InMemoryAccountRepository>,
    pub sessions: Arc<SessionTokenService>,
    pub notifier: Arc<RecordingNotifier>,
    pub publisher: Arc<RecordingPublisher>,
    pub service: Arc<TestService>,
}

pub fn harness() -> Harness {
    let repo = Arc::new(InMemoryAccountRepository::new());
    let sessions = Arc::new(SessionTokenService::new(SessionTokenConfig::new("test-secret")));
    let notifier = Arc::new(RecordingNotifier::default());
    let publisher = Arc::new(RecordingPublisher::default());
    // Cost 4 keeps bcrypt fast enough for tests.
    let service = Arc::new(AccountService::new(
        Arc::clone(&repo),
        Arc::new(BcryptPasswordHasher::with_cost(4)),
        Arc::clone(&sessions),
        Arc::clone(&notifier),
        Arc::clone(&publisher),
        AccountServiceConfig::default(),
    ));
    Harness { repo, sessions, notifier, publisher, service }
}

impl Harness {
    /// Invites `email` and returns the stored account plus the raw token
    /// captured from the activation email.
    pub async fn invite(&self, email: &str, role: RoleName) -> (Account, String) {
        let outcome = self
            .service
            .execute(AccountCommand::InviteUser {
                email: email.to_string(),
                role,
                profile: Profile::default(),
                created_by: None,
            })
            .await
            .unwrap();
        let account = outcome.into_account().unwrap();
        let mail = self
            .notifier
            .activations
            .lock()
            .await
            .last()
            .cloned()
            .expect("invitation should dispatch an activation email");
        (account, mail.token)
    }

    /// Creates an active account with a known password.
    pub async fn create_active(&self, email: &str, password: &str, role: RoleName) -> Account {
        self.service
            .execute(AccountCommand::CreateUserDirect {
                email: email.to_string(),
                password: password.to_string(),
                role,
                profile: Profile::default(),
                created_by: None,
            })
            .await
            .unwrap()
            .into_account()
            .unwrap()
    }

    /// Addresses that received a password-changed confirmation.
    pub async fn password_changed(&self) -> Vec<String> {
        self.notifier.password_changed.lock().await.clone()
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> DomainResult<CommandOutcome> {
        self.service
            .execute(AccountCommand::SignIn {
                email: email.to_string(),
                password: password.to_string(),
            })
            .await
    }
}

/// Store that loses the first creation race: a rival row with the same
/// email lands just before `create` returns, which then reports the
/// unique-constraint conflict the real database would.
pub struct RacedCreateRepository {
    inner: InMemoryAccountRepository,
    raced: Mutex<bool>,
}

impl RacedCreateRepository {
    pub fn new() -> Self {
        Self { inner: InMemoryAccountRepository::new(), raced: Mutex::new(false) }
    }

    pub async fn len(&self) -> usize {
        self.inner.len().await
    }
}

#[async_trait]
impl AccountRepository for RacedCreateRepository {
    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Account>> {
        self.inner.find_by_id(id).await
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<Account>> {
        self.inner.find_by_email(email).await
    }

    async fn find_by_reset_token_signature(
        &self,
        signature: &str,
    ) -> DomainResult<Option<Account>> {
        self.inner.find_by_reset_token_signature(signature).await
    }

    async fn exists_by_email(&self, email: &str) -> DomainResult<bool> {
        self.inner.exists_by_email(email).await
    }

    async fn exists_by_username(&self, username: &str) -> DomainResult<bool> {
        self.inner.exists_by_username(username).await
    }

    async fn create(&self, account: Account) -> DomainResult<Account> {
        let mut raced = self.raced.lock().await;
        if !*raced {
            *raced = true;
            let rival = Account::new_invited(
                account.email.as_str(),
                account.password_hash.as_str(),
                RoleName::Carrier,
                None,
            );
            self.inner.create(rival).await?;
            return Err(DomainError::Conflict { field: "email".to_string() });
        }
        drop(raced);
        self.inner.create(account).await
    }

    async fn update(&self, account: Account) -> DomainResult<Account> {
        self.inner.update(account).await
    }

    async fn delete(&self, id: Uuid) -> DomainResult<bool> {
        self.inner.delete(id).await
    }

    async fn consume_reset_token(
        &self,
        account: Account,
        signature: &str,
    ) -> DomainResult<Option<Account>> {
        self.inner.consume_reset_token(account, signature).await
    }
}

pub type RacedService =
    AccountService<RacedCreateRepository, BcryptPasswordHasher, RecordingNotifier, RecordingPublisher>;

pub struct RacedHarness {
    pub repo: Arc<RacedCreateRepository>,
    pub notifier: Arc<RecordingNotifier>,
    pub publisher: Arc<RecordingPublisher>,
    pub service: Arc<RacedService>,
}

pub fn raced_harness() -> RacedHarness {
    let repo = Arc::new(RacedCreateRepository::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let publisher = Arc::new(RecordingPublisher::default());
    let service = Arc::new(AccountService::new(
        Arc::clone(&repo),
        Arc::new(BcryptPasswordHasher::with_cost(4)),
        Arc::new(SessionTokenService::new(SessionTokenConfig::new("test-secret"))),
        Arc::clone(&notifier),
        Arc::clone(&publisher),
        AccountServiceConfig::default(),
    ));
    RacedHarness { repo, notifier, publisher, service }
}

/// Expired-token fixture: assigns a bundle that is already past its expiry.
pub async fn with_expired_token(harness: &Harness, email: &str) -> String {
    harness.invite(email, RoleName::Driver).await;
    let mut stored = harness.repo.find_by_email(email).await.unwrap().unwrap();
    let issued = harness
        .service
        .reset_tokens
        .assign(&mut stored, Duration::minutes(-5))
        .await
        .unwrap();
    harness.repo.update(stored).await.unwrap();
    issued.token
}
