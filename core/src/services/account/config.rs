//! Account service configuration.

use chrono::Duration;

#[derive(Debug, Clone)]
pub struct AccountServiceConfig {
    /// Lifetime of invitation/reset tokens. Resends re-issue with this TTL.
    pub invite_token_ttl: Duration,
    /// Minimum accepted password length.
    pub min_password_len: usize,
}

impl Default for AccountServiceConfig {
    fn default() -> Self {
        Self {
            invite_token_ttl: Duration::minutes(90),
            min_password_len: 8,
        }
    }
}
