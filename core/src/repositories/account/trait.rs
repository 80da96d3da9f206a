//! Account repository trait defining the interface for account persistence.
//!
//! Implementations own the two guards the command layer cannot provide on
//! its own: the unique constraints on email/username, and the conditional
//! update that makes reset-token consumption single-use under concurrency.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::Account;
use crate::errors::DomainResult;

/// Persistence contract for [`Account`] aggregates.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Finds an account by id.
    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Account>>;

    /// Finds an account by its unique email.
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<Account>>;

    /// Finds the account holding an outstanding reset token with the given
    /// signature. Consumed tokens are cleared, so they never match.
    async fn find_by_reset_token_signature(
        &self,
        signature: &str,
    ) -> DomainResult<Option<Account>>;

    async fn exists_by_email(&self, email: &str) -> DomainResult<bool>;

    async fn exists_by_username(&self, username: &str) -> DomainResult<bool>;

    /// Persists a new account.
    ///
    /// Returns `DomainError::Conflict` when the email or username is already
    /// taken; the store's unique constraint is the authoritative guard
    /// against concurrent creation.
    async fn create(&self, account: Account) -> DomainResult<Account>;

    /// Persists an updated account.
    ///
    /// Returns `DomainError::NotFound` when the account no longer exists.
    async fn update(&self, account: Account) -> DomainResult<Account>;

    /// Deletes an account. Returns whether a record was removed.
    async fn delete(&self, id: Uuid) -> DomainResult<bool>;

    /// Persists `account` (with the token consumed and the mutation applied)
    /// only if the stored row still carries an unused reset token with
    /// `signature`. A single conditional write: two concurrent redemptions
    /// of one token cannot both succeed.
    ///
    /// Returns `None` when another redemption won the race.
    async fn consume_reset_token(
        &self,
        account: Account,
        signature: &str,
    ) -> DomainResult<Option<Account>>;
}
