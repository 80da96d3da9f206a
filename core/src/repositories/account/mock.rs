//! In-memory implementation of AccountRepository for testing.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::Account;
use crate::errors::{DomainError, DomainResult};

use super::trait_::AccountRepository;

/// In-memory account store with the same uniqueness and conditional-update
/// guarantees as the real database.
#[derive(Clone)]
pub struct InMemoryAccountRepository {
    accounts: Arc<RwLock<HashMap<Uuid, Account>>>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self { accounts: Arc::new(RwLock::new(HashMap::new())) }
    }

    /// Number of stored accounts, used by idempotence tests.
    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }
}

impl Default for InMemoryAccountRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.values().find(|a| a.email == email).cloned())
    }

    async fn find_by_reset_token_signature(
        &self,
        signature: &str,
    ) -> DomainResult<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .values()
            .find(|a| {
                a.reset_token
                    .as_ref()
                    .map(|bundle| bundle.signature == signature)
                    .unwrap_or(false)
            })
            .cloned())
    }

    async fn exists_by_email(&self, email: &str) -> DomainResult<bool> {
        let accounts = self.accounts.read().await;
        Ok(accounts.values().any(|a| a.email == email))
    }

    async fn exists_by_username(&self, username: &str) -> DomainResult<bool> {
        let accounts = self.accounts.read().await;
        Ok(accounts.values().any(|a| a.username == username))
    }

    async fn create(&self, account: Account) -> DomainResult<Account> {
        let mut accounts = self.accounts.write().await;

        if accounts.values().any(|a| a.email == account.email) {
            return Err(DomainError::Conflict { field: "email".to_string() });
        }
        if accounts.values().any(|a| a.username == account.username) {
            return Err(DomainError::Conflict { field: "username".to_string() });
        }

        accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn update(&self, account: Account) -> DomainResult<Account> {
        let mut accounts = self.accounts.write().await;

        if !accounts.contains_key(&account.id) {
            return Err(DomainError::NotFound { resource: "account".to_string() });
        }

        accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn delete(&self, id: Uuid) -> DomainResult<bool> {
        let mut accounts = self.accounts.write().await;
        Ok(accounts.remove(&id).is_some())
    }

    async fn consume_reset_token(
        &self,
        account: Account,
        signature: &str,
    ) -> DomainResult<Option<Account>> {
        // Check-and-set under the write lock, mirroring the SQL
        // `UPDATE .. WHERE reset_token_used = 0 AND reset_token_signature = ?`.
        let mut accounts = self.accounts.write().await;

        let claimable = accounts
            .get(&account.id)
            .map(|stored| {
                !stored.reset_token_used
                    && stored
                        .reset_token
                        .as_ref()
                        .map(|bundle| bundle.signature == signature)
                        .unwrap_or(false)
            })
            .unwrap_or(false);

        if !claimable {
            return Ok(None);
        }

        accounts.insert(account.id, account.clone());
        Ok(Some(account))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{ResetTokenBundle, RoleName};
    use chrono::{Duration, Utc};

    fn invited(email: &str) -> Account {
        Account::new_invited(email, "$2b$04$placeholder", RoleName::Driver, None)
    }

    #[tokio::test]
    async fn create_rejects_duplicate_email() {
        let repo = InMemoryAccountRepository::new();
        repo.create(invited("a@x.com")).await.unwrap();
        let err = repo.create(invited("a@x.com")).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict { .. }));
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn consume_is_a_conditional_update() {
        let repo = InMemoryAccountRepository::new();
        let mut account = invited("a@x.com");
        account.assign_reset_token(ResetTokenBundle {
            hash: "h".into(),
            signature: "sig".into(),
            expires_at: Utc::now() + Duration::minutes(90),
        });
        repo.create(account.clone()).await.unwrap();

        let mut consumed = account.clone();
        consumed.consume_reset_token(Utc::now());

        let first = repo.consume_reset_token(consumed.clone(), "sig").await.unwrap();
        assert!(first.is_some());
        // Second attempt sees the cleared bundle and loses.
        let second = repo.consume_reset_token(consumed, "sig").await.unwrap();
        assert!(second.is_none());
    }
}
