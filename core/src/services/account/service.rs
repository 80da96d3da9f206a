//! Main account command service implementation.

use std::collections::BTreeSet;
use std::sync::Arc;

use uuid::Uuid;

use crate::domain::commands::{AccountCommand, CommandOutcome};
use crate::domain::entities::{Account, AccountStatus, Profile, RoleName};
use crate::domain::value_objects::AuthenticatedAccount;
use crate::errors::{AuthError, DomainError, DomainResult};
use crate::repositories::AccountRepository;
use crate::services::hashing::PasswordHasher;
use crate::services::outbound::{EventPublisher, NotificationDispatcher};
use crate::services::reset_token::ResetTokenService;
use crate::services::session::SessionTokenService;

use super::config::AccountServiceConfig;

/// Account credential and lifecycle service.
///
/// All storage goes through the repository; notification dispatch and event
/// publishing are fire-and-forget side effects.
pub struct AccountService<R, H, N, E>
where
    R: AccountRepository,
    H: PasswordHasher,
    N: NotificationDispatcher,
    E: EventPublisher,
{
    pub(super) accounts: Arc<R>,
    pub(super) hasher: Arc<H>,
    pub(super) sessions: Arc<SessionTokenService>,
    pub(super) reset_tokens: ResetTokenService<H>,
    pub(super) notifications: Arc<N>,
    pub(super) events: Arc<E>,
    pub(super) config: AccountServiceConfig,
}

impl<R, H, N, E> AccountService<R, H, N, E>
where
    R: AccountRepository,
    H: PasswordHasher,
    N: NotificationDispatcher,
    E: EventPublisher,
{
    pub fn new(
        accounts: Arc<R>,
        hasher: Arc<H>,
        sessions: Arc<SessionTokenService>,
        notifications: Arc<N>,
        events: Arc<E>,
        config: AccountServiceConfig,
    ) -> Self {
        let reset_tokens = ResetTokenService::new(Arc::clone(&hasher));
        Self { accounts, hasher, sessions, reset_tokens, notifications, events, config }
    }

    /// Single dispatch point: selects behavior by command variant.
    pub async fn execute(&self, command: AccountCommand) -> DomainResult<CommandOutcome> {
        match command {
            AccountCommand::SignIn { email, password } => self
                .sign_in(&email, &password)
                .await
                .map(CommandOutcome::Authenticated),
            AccountCommand::ChangePassword { account_id, current_password, new_password } => self
                .change_password(account_id, &current_password, &new_password)
                .await
                .map(CommandOutcome::Account),
            AccountCommand::ChangeEmail { account_id, password, new_email } => self
                .change_email(account_id, &password, &new_email)
                .await
                .map(CommandOutcome::Account),
            AccountCommand::InviteUser { email, role, profile, created_by } => self
                .invite(&email, role, profile, created_by)
                .await
                .map(CommandOutcome::Account),
            AccountCommand::ResendInvite { account_id } => {
                self.resend_invite(account_id).await.map(CommandOutcome::Account)
            }
            AccountCommand::ResetPasswordWithToken { token, new_password } => self
                .reset_password_with_token(&token, &new_password)
                .await
                .map(CommandOutcome::Account),
            AccountCommand::CreateAdminUser { username, email, password } => self
                .create_admin(username.as_deref(), &email, &password)
                .await
                .map(CommandOutcome::Account),
            AccountCommand::CreateUserDirect { email, password, role, profile, created_by } => self
                .create_direct(&email, &password, role, profile, created_by)
                .await
                .map(CommandOutcome::Account),
            AccountCommand::UpdateUserStatus { account_id, enabled } => self
                .update_status(account_id, enabled)
                .await
                .map(CommandOutcome::Account),
            AccountCommand::DeleteAccount { account_id } => {
                self.delete(account_id).await.map(CommandOutcome::Deleted)
            }
        }
    }

    /// Authenticates an account and issues a session token.
    ///
    /// Check order matters: the unknown-email and wrong-password paths must
    /// return the same error so the endpoint cannot be used to enumerate
    /// accounts, while activation/disabled states are reported explicitly.
    async fn sign_in(&self, email: &str, password: &str) -> DomainResult<AuthenticatedAccount> {
        let account = self
            .accounts
            .find_by_email(email)
            .await?
            .ok_or(DomainError::Auth(AuthError::InvalidCredentials))?;

        if matches!(
            account.status,
            AccountStatus::Invited | AccountStatus::PendingActivation
        ) {
            return Err(AuthError::AccountNotActivated.into());
        }

        if account.status == AccountStatus::Disabled || !account.enabled {
            return Err(AuthError::AccountDisabled.into());
        }

        if !self.hasher.matches(password, &account.password_hash).await? {
            return Err(AuthError::InvalidCredentials.into());
        }

        let token = self.sessions.issue(&account.email)?;
        tracing::info!(email = %account.email, "sign-in successful");
        Ok(AuthenticatedAccount::new(account, token))
    }

    async fn change_password(
        &self,
        account_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> DomainResult<Account> {
        self.validate_password(new_password)?;
        let mut account = self.require_account(account_id).await?;

        if !self.hasher.matches(current_password, &account.password_hash).await? {
            return Err(AuthError::InvalidCredentials.into());
        }

        let hash = self.hasher.encode(new_password).await?;
        account.set_password_hash(hash);
        self.accounts.update(account).await
    }

    async fn change_email(
        &self,
        account_id: Uuid,
        password: &str,
        new_email: &str,
    ) -> DomainResult<Account> {
        if new_email.trim().is_empty() {
            return Err(DomainError::validation("email required"));
        }
        let mut account = self.require_account(account_id).await?;

        if !self.hasher.matches(password, &account.password_hash).await? {
            return Err(AuthError::InvalidCredentials.into());
        }
        if self.accounts.exists_by_email(new_email).await? {
            return Err(DomainError::Conflict { field: "email".to_string() });
        }

        account.set_email(new_email.to_string());
        self.accounts.update(account).await
    }

    async fn create_admin(
        &self,
        username: Option<&str>,
        email: &str,
        password: &str,
    ) -> DomainResult<Account> {
        if email.trim().is_empty() {
            return Err(DomainError::validation("email required"));
        }
        if password.trim().is_empty() {
            return Err(DomainError::validation("password required"));
        }

        let username = match username {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => email.to_string(),
        };

        if self.accounts.exists_by_email(email).await? {
            return Err(DomainError::Conflict { field: "email".to_string() });
        }
        if self.accounts.exists_by_username(&username).await? {
            return Err(DomainError::Conflict { field: "username".to_string() });
        }

        let hash = self.hasher.encode(password).await?;
        let account = Account::new_active(
            email,
            username,
            hash,
            BTreeSet::from([RoleName::Admin]),
            None,
        );
        let saved = self.accounts.create(account).await?;
        self.publish_account_created(&saved, "admin-portal").await;
        Ok(saved)
    }

    async fn create_direct(
        &self,
        email: &str,
        password: &str,
        role: RoleName,
        profile: Profile,
        created_by: Option<Uuid>,
    ) -> DomainResult<Account> {
        if email.trim().is_empty() {
            return Err(DomainError::validation("email required"));
        }
        self.validate_password(password)?;
        if !matches!(role, RoleName::Carrier | RoleName::Driver) {
            return Err(DomainError::validation(
                "direct creation is limited to CARRIER or DRIVER profiles",
            ));
        }
        if self.accounts.exists_by_email(email).await? {
            return Err(DomainError::Conflict { field: "email".to_string() });
        }

        let mut username = profile
            .full_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(email)
            .to_string();
        if username != email && self.accounts.exists_by_username(&username).await? {
            // Fall back to the email when the display name is taken.
            username = email.to_string();
        }

        let hash = self.hasher.encode(password).await?;
        let mut account =
            Account::new_active(email, username, hash, BTreeSet::from([role]), created_by);
        account.profile = sanitize_profile(profile);

        let saved = self.accounts.create(account).await?;
        tracing::info!(email = %saved.email, role = %role, "account created directly by admin");
        self.publish_account_created(&saved, "admin-direct-create").await;
        Ok(saved)
    }

    /// Startup seeding: makes sure the configured admin account exists and
    /// is usable. Existing accounts are refreshed, never duplicated.
    pub async fn ensure_admin(
        &self,
        username: Option<&str>,
        email: &str,
        password: &str,
    ) -> DomainResult<Account> {
        match self.accounts.find_by_email(email).await? {
            None => {
                let account = self.create_admin(username, email, password).await?;
                tracing::info!(email = %account.email, "seeded admin account");
                Ok(account)
            }
            Some(existing) => {
                let mut account = existing.with_role(RoleName::Admin);
                account.activate();
                if let Some(name) = username.map(str::trim).filter(|n| !n.is_empty()) {
                    account.username = name.to_string();
                }
                let hash = self.hasher.encode(password).await?;
                account.set_password_hash(hash);
                let saved = self.accounts.update(account).await?;
                tracing::info!(email = %saved.email, "refreshed seeded admin account");
                Ok(saved)
            }
        }
    }

    async fn update_status(&self, account_id: Uuid, enabled: bool) -> DomainResult<Account> {
        let mut account = self.require_account(account_id).await?;
        if enabled {
            account.activate();
        } else {
            account.disable();
        }
        self.accounts.update(account).await
    }

    async fn delete(&self, account_id: Uuid) -> DomainResult<bool> {
        let deleted = self.accounts.delete(account_id).await?;
        if deleted {
            tracing::info!(%account_id, "account deleted");
        } else {
            tracing::warn!(%account_id, "delete requested for unknown account");
        }
        Ok(deleted)
    }

    pub(super) async fn require_account(&self, account_id: Uuid) -> DomainResult<Account> {
        self.accounts
            .find_by_id(account_id)
            .await?
            .ok_or(DomainError::NotFound { resource: "account".to_string() })
    }

    pub(super) fn validate_password(&self, password: &str) -> DomainResult<()> {
        if password.len() < self.config.min_password_len {
            return Err(DomainError::validation(format!(
                "password must be at least {} characters",
                self.config.min_password_len
            )));
        }
        Ok(())
    }

    /// Best-effort event publish; failures are logged and swallowed.
    pub(super) async fn publish_account_created(&self, account: &Account, context: &str) {
        if let Err(error) = self.events.publish_account_created(account.id, &account.email).await {
            tracing::error!(
                account_id = %account.id,
                context,
                %error,
                "failed to publish account-created event"
            );
        } else {
            tracing::info!(account_id = %account.id, context, "account-created event published");
        }
    }
}

/// Trims profile strings and drops blanks.
pub(super) fn sanitize_profile(profile: Profile) -> Profile {
    let clean = |value: Option<String>| {
        value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
    };
    Profile {
        full_name: clean(profile.full_name),
        city: clean(profile.city),
        company: clean(profile.company),
        fleet_size: profile.fleet_size,
        phone: clean(profile.phone),
        vehicle: clean(profile.vehicle),
    }
}
