//! Invitation issuance, resend and token-based password reset.

use chrono::Utc;
use uuid::Uuid;

use crate::domain::entities::{Account, AccountStatus, Profile, RoleName};
use crate::errors::{AuthError, DomainError, DomainResult, TokenError};
use crate::repositories::AccountRepository;
use crate::services::hashing::PasswordHasher;
use crate::services::outbound::{EventPublisher, NotificationDispatcher};
use crate::services::reset_token::IssuedToken;

use super::service::{sanitize_profile, AccountService};

impl<R, H, N, E> AccountService<R, H, N, E>
where
    R: AccountRepository,
    H: PasswordHasher,
    N: NotificationDispatcher,
    E: EventPublisher,
{
    /// Invites `email` with `role`, creating the account if needed.
    ///
    /// The operation is an upsert: repeated invitations of the same address
    /// add the role, replace the profile with the submitted fields and
    /// re-issue the activation token. Each issued token invalidates the
    /// previous one.
    pub(super) async fn invite(
        &self,
        email: &str,
        role: RoleName,
        profile: Profile,
        created_by: Option<Uuid>,
    ) -> DomainResult<Account> {
        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(DomainError::validation("a valid email is required"));
        }
        let profile = sanitize_profile(profile);

        let (saved, issued) = match self.accounts.find_by_email(email).await? {
            Some(existing) => self.reinvite_existing(existing, role, profile).await?,
            None => match self.invite_new(email, role, profile.clone(), created_by).await {
                Ok((saved, issued)) => {
                    self.publish_account_created(&saved, "invitation").await;
                    (saved, issued)
                }
                // A concurrent invitation created the row first; fold into
                // the upsert path instead of surfacing the conflict.
                Err(DomainError::Conflict { .. }) => {
                    let existing = self
                        .accounts
                        .find_by_email(email)
                        .await?
                        .ok_or_else(|| {
                            DomainError::internal("conflicting account vanished during invite")
                        })?;
                    self.reinvite_existing(existing, role, profile).await?
                }
                Err(other) => return Err(other),
            },
        };

        self.dispatch_activation(&saved, &issued).await;
        Ok(saved)
    }

    async fn invite_new(
        &self,
        email: &str,
        role: RoleName,
        profile: Profile,
        created_by: Option<Uuid>,
    ) -> DomainResult<(Account, IssuedToken)> {
        let placeholder = self
            .hasher
            .encode(&format!("{}-seed", Uuid::new_v4()))
            .await?;
        let mut account = Account::new_invited(email, placeholder, role, created_by);
        account.profile = profile;
        let issued = self
            .reset_tokens
            .assign(&mut account, self.config.invite_token_ttl)
            .await?;
        let saved = self.accounts.create(account).await?;
        tracing::info!(email = %saved.email, role = %role, "invitation created new account");
        Ok((saved, issued))
    }

    async fn reinvite_existing(
        &self,
        existing: Account,
        role: RoleName,
        profile: Profile,
    ) -> DomainResult<(Account, IssuedToken)> {
        let mut account = existing.with_role(role);
        account.mark_invited();
        // The submitted profile wins outright; omitted fields are cleared.
        account.profile = profile;
        let issued = self
            .reset_tokens
            .assign(&mut account, self.config.invite_token_ttl)
            .await?;
        let saved = self.accounts.update(account).await?;
        tracing::info!(email = %saved.email, role = %role, "invitation refreshed existing account");
        Ok((saved, issued))
    }

    /// Re-issues the activation token for an already invited account.
    pub(super) async fn resend_invite(&self, account_id: Uuid) -> DomainResult<Account> {
        let mut account = self.require_account(account_id).await?;
        if account.status == AccountStatus::Disabled {
            return Err(AuthError::AccountDisabled.into());
        }
        account.mark_invited();
        let issued = self
            .reset_tokens
            .assign(&mut account, self.config.invite_token_ttl)
            .await?;
        let saved = self.accounts.update(account).await?;
        self.dispatch_activation(&saved, &issued).await;
        Ok(saved)
    }

    /// Redeems a reset token: sets the new password, activates the account
    /// and consumes the token in a single conditional write.
    pub(super) async fn reset_password_with_token(
        &self,
        token: &str,
        new_password: &str,
    ) -> DomainResult<Account> {
        let token = token.trim();
        if token.is_empty() {
            return Err(DomainError::validation("token required"));
        }
        self.validate_password(new_password)?;

        let signature = self.reset_tokens.signature_of(token);
        let account = self
            .accounts
            .find_by_reset_token_signature(&signature)
            .await?
            .ok_or(DomainError::NotFound { resource: "reset token".to_string() })?;

        let bundle = account
            .reset_token
            .as_ref()
            .ok_or(DomainError::Token(TokenError::AlreadyUsed))?;
        if account.reset_token_used {
            return Err(TokenError::AlreadyUsed.into());
        }
        if bundle.expires_at < Utc::now() {
            return Err(TokenError::Expired.into());
        }
        if !self.reset_tokens.verify(token, &bundle.hash).await? {
            return Err(TokenError::Invalid.into());
        }

        let hash = self.hasher.encode(new_password).await?;
        let mut updated = account.clone();
        updated.set_password_hash(hash);
        updated.activate();
        updated.consume_reset_token(Utc::now());

        let saved = self
            .accounts
            .consume_reset_token(updated, &signature)
            .await?
            .ok_or(DomainError::Token(TokenError::AlreadyUsed))?;

        tracing::info!(email = %saved.email, "password reset via token");
        if let Err(error) = self
            .notifications
            .send_password_changed_email(&saved.email, saved.display_name())
            .await
        {
            tracing::warn!(email = %saved.email, %error, "password-changed email not delivered");
        }
        Ok(saved)
    }

    /// Sends the activation email carrying the raw token. Best effort: a
    /// delivery failure never fails the invitation itself.
    async fn dispatch_activation(&self, account: &Account, issued: &IssuedToken) {
        if let Err(error) = self
            .notifications
            .send_activation_email(
                &account.email,
                account.display_name(),
                &issued.token,
                issued.expires_at,
            )
            .await
        {
            tracing::warn!(email = %account.email, %error, "activation email not delivered");
        }
    }
}
