//! Authentication DTOs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use iam_core::domain::entities::RoleName;
use iam_core::domain::value_objects::AuthenticatedAccount;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignInRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignInResponse {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub roles: Vec<RoleName>,
    pub token: String,
}

impl From<AuthenticatedAccount> for SignInResponse {
    fn from(auth: AuthenticatedAccount) -> Self {
        Self {
            id: auth.account.id,
            email: auth.account.email,
            username: auth.account.username,
            roles: auth.account.roles.into_iter().collect(),
            token: auth.session_token,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1))]
    pub token: String,
    #[validate(length(min = 8))]
    pub new_password: String,
    pub confirm_password: String,
}
