//! Generation and assignment of single-use reset tokens.
//!
//! A token exists in three forms: the raw value handed to the user (never
//! persisted), the SHA-256 signature used as the store lookup key, and the
//! bcrypt hash used for verification. An attacker who can read the store
//! holds neither the raw token nor anything redeemable.

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::domain::entities::{Account, ResetTokenBundle};
use crate::errors::DomainResult;
use crate::services::hashing::PasswordHasher;

/// Raw bytes of entropy per token; 48 bytes = 384 bits, comfortably above
/// the 256-bit floor.
const TOKEN_BYTES: usize = 48;

/// A freshly issued token: the raw value for the notification and its expiry.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Generates, fingerprints and assigns reset tokens.
///
/// Consumption is orchestrated by the account service, which pairs the
/// checks here with the store's conditional update.
pub struct ResetTokenService<H: PasswordHasher> {
    hasher: Arc<H>,
}

impl<H: PasswordHasher> ResetTokenService<H> {
    pub fn new(hasher: Arc<H>) -> Self {
        Self { hasher }
    }

    /// Generates a cryptographically-random, URL-safe opaque token.
    pub fn generate(&self) -> String {
        let mut buffer = [0u8; TOKEN_BYTES];
        rand::rngs::OsRng.fill_bytes(&mut buffer);
        URL_SAFE_NO_PAD.encode(buffer)
    }

    /// Deterministic one-way fingerprint of `token`, used only as a lookup key.
    pub fn signature_of(&self, token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Verifies `token` against the stored verification hash.
    pub async fn verify(&self, token: &str, stored_hash: &str) -> DomainResult<bool> {
        self.hasher.matches(token, stored_hash).await
    }

    /// Issues a fresh token and installs its bundle on `account`, overwriting
    /// and thereby invalidating any previously issued token.
    pub async fn assign(&self, account: &mut Account, ttl: Duration) -> DomainResult<IssuedToken> {
        let token = self.generate();
        let expires_at = Utc::now() + ttl;
        let bundle = ResetTokenBundle {
            hash: self.hasher.encode(&token).await?,
            signature: self.signature_of(&token),
            expires_at,
        };
        account.assign_reset_token(bundle);
        Ok(IssuedToken { token, expires_at })
    }
}
