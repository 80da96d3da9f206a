//! Sign-in result value object.

use serde::{Deserialize, Serialize};

use crate::domain::entities::Account;

/// An account paired with the session token issued for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedAccount {
    pub account: Account,
    pub session_token: String,
}

impl AuthenticatedAccount {
    pub fn new(account: Account, session_token: String) -> Self {
        Self { account, session_token }
    }
}
