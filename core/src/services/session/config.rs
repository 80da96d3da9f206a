//! Session token configuration.

use chrono::Duration;

/// Configuration for [`super::SessionTokenService`].
#[derive(Debug, Clone)]
pub struct SessionTokenConfig {
    /// HS256 signing secret.
    pub secret: String,
    /// Session lifetime; expiry is the only invalidation mechanism.
    pub ttl: Duration,
    /// Issuer claim, validated on decode.
    pub issuer: String,
}

impl SessionTokenConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ttl: Duration::hours(24),
            issuer: "fleet-iam".to_string(),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}
