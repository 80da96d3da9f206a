//! One-way password hashing and verification.

use async_trait::async_trait;

use crate::errors::{DomainError, DomainResult};

/// One-way credential hashing.
///
/// `matches` never decodes the stored hash, and its timing does not depend
/// on where a mismatch occurs. A malformed stored hash is an integrity
/// problem and verifies as "no match" rather than an error.
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// Hashes `raw` with a per-call random salt embedded in the output.
    async fn encode(&self, raw: &str) -> DomainResult<String>;

    /// Verifies `raw` against a stored hash.
    async fn matches(&self, raw: &str, hash: &str) -> DomainResult<bool>;
}

/// bcrypt-backed hasher.
///
/// bcrypt is CPU-bound, so both operations run on the blocking pool instead
/// of an executor thread that serves other requests' I/O.
pub struct BcryptPasswordHasher {
    cost: u32,
}

impl BcryptPasswordHasher {
    pub fn new() -> Self {
        Self { cost: bcrypt::DEFAULT_COST }
    }

    /// Lower costs are useful in tests; bcrypt clamps anything below 4.
    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptPasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PasswordHasher for BcryptPasswordHasher {
    async fn encode(&self, raw: &str) -> DomainResult<String> {
        let raw = raw.to_string();
        let cost = self.cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(raw, cost))
            .await
            .map_err(|e| DomainError::internal(format!("hashing task failed: {e}")))?
            .map_err(|e| DomainError::internal(format!("bcrypt hashing failed: {e}")))
    }

    async fn matches(&self, raw: &str, hash: &str) -> DomainResult<bool> {
        let raw = raw.to_string();
        let hash = hash.to_string();
        let verified = tokio::task::spawn_blocking(move || bcrypt::verify(raw, &hash))
            .await
            .map_err(|e| DomainError::internal(format!("hashing task failed: {e}")))?;
        // Malformed stored hash: treat as no match.
        Ok(verified.unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> BcryptPasswordHasher {
        BcryptPasswordHasher::with_cost(4)
    }

    #[tokio::test]
    async fn encode_then_matches_round_trip() {
        let hasher = hasher();
        let hash = hasher.encode("S3cret!pass").await.unwrap();
        assert!(hasher.matches("S3cret!pass", &hash).await.unwrap());
        assert!(!hasher.matches("other", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn salts_are_per_call() {
        let hasher = hasher();
        let first = hasher.encode("same").await.unwrap();
        let second = hasher.encode("same").await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn malformed_hash_is_no_match() {
        let hasher = hasher();
        assert!(!hasher.matches("any", "not-a-bcrypt-hash").await.unwrap());
        assert!(!hasher.matches("any", "").await.unwrap());
    }
}
