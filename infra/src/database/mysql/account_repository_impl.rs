//! MySQL implementation of the AccountRepository trait.
//!
//! Uniqueness is enforced by the `uk_accounts_email` and
//! `uk_accounts_username` indexes; token consumption is a conditional
//! UPDATE so a token can never be redeemed twice.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use iam_core::domain::entities::{
    Account, AccountStatus, AuditMetadata, Profile, ResetTokenBundle, RoleName,
};
use iam_core::errors::{DomainError, DomainResult};
use iam_core::repositories::AccountRepository;

const SELECT_COLUMNS: &str = r#"
    SELECT id, email, username, password_hash, roles, created_by,
           enabled, status, full_name, city, company, fleet_size,
           phone, vehicle, reset_token_hash, reset_token_signature,
           reset_token_expires_at, reset_token_used, reset_token_used_at,
           created_at, updated_at
    FROM accounts
"#;

/// MySQL account repository.
pub struct MySqlAccountRepository {
    pool: MySqlPool,
}

impl MySqlAccountRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Serializes the role set to its stored comma-separated form.
    fn roles_to_column(roles: &BTreeSet<RoleName>) -> String {
        roles.iter().map(RoleName::as_str).collect::<Vec<_>>().join(",")
    }

    fn roles_from_column(value: &str) -> BTreeSet<RoleName> {
        value.split(',').filter_map(RoleName::parse).collect()
    }

    /// Converts a database row to an [`Account`] entity.
    fn row_to_account(row: &sqlx::mysql::MySqlRow) -> DomainResult<Account> {
        let get = |column: &str, e: sqlx::Error| {
            DomainError::internal(format!("failed to read column {column}: {e}"))
        };

        let id: String = row.try_get("id").map_err(|e| get("id", e))?;
        let roles: String = row.try_get("roles").map_err(|e| get("roles", e))?;
        let status: String = row.try_get("status").map_err(|e| get("status", e))?;
        let created_by: Option<String> =
            row.try_get("created_by").map_err(|e| get("created_by", e))?;

        let hash: Option<String> =
            row.try_get("reset_token_hash").map_err(|e| get("reset_token_hash", e))?;
        let signature: Option<String> = row
            .try_get("reset_token_signature")
            .map_err(|e| get("reset_token_signature", e))?;
        let expires_at: Option<DateTime<Utc>> = row
            .try_get("reset_token_expires_at")
            .map_err(|e| get("reset_token_expires_at", e))?;
        // The bundle exists as a whole or not at all.
        let reset_token = match (hash, signature, expires_at) {
            (Some(hash), Some(signature), Some(expires_at)) => {
                Some(ResetTokenBundle { hash, signature, expires_at })
            }
            _ => None,
        };

        Ok(Account {
            id: Uuid::parse_str(&id)
                .map_err(|e| DomainError::internal(format!("invalid account id: {e}")))?,
            email: row.try_get("email").map_err(|e| get("email", e))?,
            username: row.try_get("username").map_err(|e| get("username", e))?,
            password_hash: row.try_get("password_hash").map_err(|e| get("password_hash", e))?,
            roles: Self::roles_from_column(&roles),
            created_by: created_by
                .map(|v| {
                    Uuid::parse_str(&v)
                        .map_err(|e| DomainError::internal(format!("invalid created_by: {e}")))
                })
                .transpose()?,
            enabled: row.try_get("enabled").map_err(|e| get("enabled", e))?,
            status: AccountStatus::parse(&status)
                .ok_or_else(|| DomainError::internal(format!("unknown status: {status}")))?,
            profile: Profile {
                full_name: row.try_get("full_name").map_err(|e| get("full_name", e))?,
                city: row.try_get("city").map_err(|e| get("city", e))?,
                company: row.try_get("company").map_err(|e| get("company", e))?,
                fleet_size: row.try_get("fleet_size").map_err(|e| get("fleet_size", e))?,
                phone: row.try_get("phone").map_err(|e| get("phone", e))?,
                vehicle: row.try_get("vehicle").map_err(|e| get("vehicle", e))?,
            },
            reset_token,
            reset_token_used: row
                .try_get("reset_token_used")
                .map_err(|e| get("reset_token_used", e))?,
            reset_token_used_at: row
                .try_get("reset_token_used_at")
                .map_err(|e| get("reset_token_used_at", e))?,
            audit: AuditMetadata {
                created_at: row.try_get("created_at").map_err(|e| get("created_at", e))?,
                updated_at: row.try_get("updated_at").map_err(|e| get("updated_at", e))?,
            },
        })
    }

    /// Maps a unique-constraint violation to the conflicting field.
    fn map_write_error(e: sqlx::Error) -> DomainError {
        if let sqlx::Error::Database(ref db) = e {
            if db.code().as_deref() == Some("23000") {
                let field = if db.message().contains("email") {
                    "email"
                } else if db.message().contains("username") {
                    "username"
                } else {
                    "account"
                };
                return DomainError::Conflict { field: field.to_string() };
            }
        }
        DomainError::internal(format!("database write failed: {e}"))
    }

    async fn fetch_one_where(
        &self,
        clause: &str,
        bind: &str,
    ) -> DomainResult<Option<Account>> {
        let query = format!("{SELECT_COLUMNS} WHERE {clause} LIMIT 1");
        let row = sqlx::query(&query)
            .bind(bind)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::internal(format!("database query failed: {e}")))?;

        row.map(|r| Self::row_to_account(&r)).transpose()
    }
}

#[async_trait]
impl AccountRepository for MySqlAccountRepository {
    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Account>> {
        self.fetch_one_where("id = ?", &id.to_string()).await
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<Account>> {
        self.fetch_one_where("email = ?", email).await
    }

    async fn find_by_reset_token_signature(
        &self,
        signature: &str,
    ) -> DomainResult<Option<Account>> {
        self.fetch_one_where("reset_token_signature = ?", signature).await
    }

    async fn exists_by_email(&self, email: &str) -> DomainResult<bool> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM accounts WHERE email = ?")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::internal(format!("database query failed: {e}")))?;
        let count: i64 = row
            .try_get("n")
            .map_err(|e| DomainError::internal(format!("failed to read count: {e}")))?;
        Ok(count > 0)
    }

    async fn exists_by_username(&self, username: &str) -> DomainResult<bool> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM accounts WHERE username = ?")
            .bind(username)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::internal(format!("database query failed: {e}")))?;
        let count: i64 = row
            .try_get("n")
            .map_err(|e| DomainError::internal(format!("failed to read count: {e}")))?;
        Ok(count > 0)
    }

    async fn create(&self, account: Account) -> DomainResult<Account> {
        let query = r#"
            INSERT INTO accounts (
                id, email, username, password_hash, roles, created_by,
                enabled, status, full_name, city, company, fleet_size,
                phone, vehicle, reset_token_hash, reset_token_signature,
                reset_token_expires_at, reset_token_used, reset_token_used_at,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#;

        let bundle = account.reset_token.as_ref();
        sqlx::query(query)
            .bind(account.id.to_string())
            .bind(&account.email)
            .bind(&account.username)
            .bind(&account.password_hash)
            .bind(Self::roles_to_column(&account.roles))
            .bind(account.created_by.map(|id| id.to_string()))
            .bind(account.enabled)
            .bind(account.status.as_str())
            .bind(&account.profile.full_name)
            .bind(&account.profile.city)
            .bind(&account.profile.company)
            .bind(account.profile.fleet_size)
            .bind(&account.profile.phone)
            .bind(&account.profile.vehicle)
            .bind(bundle.map(|b| b.hash.as_str()))
            .bind(bundle.map(|b| b.signature.as_str()))
            .bind(bundle.map(|b| b.expires_at))
            .bind(account.reset_token_used)
            .bind(account.reset_token_used_at)
            .bind(account.audit.created_at)
            .bind(account.audit.updated_at)
            .execute(&self.pool)
            .await
            .map_err(Self::map_write_error)?;

        Ok(account)
    }

    async fn update(&self, account: Account) -> DomainResult<Account> {
        let query = r#"
            UPDATE accounts SET
                email = ?, username = ?, password_hash = ?, roles = ?,
                enabled = ?, status = ?, full_name = ?, city = ?,
                company = ?, fleet_size = ?, phone = ?, vehicle = ?,
                reset_token_hash = ?, reset_token_signature = ?,
                reset_token_expires_at = ?, reset_token_used = ?,
                reset_token_used_at = ?, updated_at = ?
            WHERE id = ?
        "#;

        let bundle = account.reset_token.as_ref();
        let result = sqlx::query(query)
            .bind(&account.email)
            .bind(&account.username)
            .bind(&account.password_hash)
            .bind(Self::roles_to_column(&account.roles))
            .bind(account.enabled)
            .bind(account.status.as_str())
            .bind(&account.profile.full_name)
            .bind(&account.profile.city)
            .bind(&account.profile.company)
            .bind(account.profile.fleet_size)
            .bind(&account.profile.phone)
            .bind(&account.profile.vehicle)
            .bind(bundle.map(|b| b.hash.as_str()))
            .bind(bundle.map(|b| b.signature.as_str()))
            .bind(bundle.map(|b| b.expires_at))
            .bind(account.reset_token_used)
            .bind(account.reset_token_used_at)
            .bind(account.audit.updated_at)
            .bind(account.id.to_string())
            .execute(&self.pool)
            .await
            .map_err(Self::map_write_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound { resource: "account".to_string() });
        }
        Ok(account)
    }

    async fn delete(&self, id: Uuid) -> DomainResult<bool> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::internal(format!("database delete failed: {e}")))?;
        Ok(result.rows_affected() > 0)
    }

    async fn consume_reset_token(
        &self,
        account: Account,
        signature: &str,
    ) -> DomainResult<Option<Account>> {
        // The WHERE clause is the single-use guard: only an unused token
        // with the matching signature can be claimed, and only once.
        let query = r#"
            UPDATE accounts SET
                password_hash = ?, enabled = ?, status = ?,
                reset_token_hash = NULL, reset_token_signature = NULL,
                reset_token_expires_at = NULL, reset_token_used = 1,
                reset_token_used_at = ?, updated_at = ?
            WHERE id = ? AND reset_token_used = 0 AND reset_token_signature = ?
        "#;

        let result = sqlx::query(query)
            .bind(&account.password_hash)
            .bind(account.enabled)
            .bind(account.status.as_str())
            .bind(account.reset_token_used_at)
            .bind(account.audit.updated_at)
            .bind(account.id.to_string())
            .bind(signature)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::internal(format!("database update failed: {e}")))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Ok(Some(account))
    }
}
