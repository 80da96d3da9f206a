//! Account commands as a tagged union with a single dispatch point.
//!
//! One variant per operation the service accepts; the account service
//! selects behavior by variant in `execute`.

use uuid::Uuid;

use super::entities::{Account, Profile, RoleName};
use super::value_objects::AuthenticatedAccount;

/// Commands consumed by the account service.
#[derive(Debug, Clone)]
pub enum AccountCommand {
    SignIn {
        email: String,
        password: String,
    },
    ChangePassword {
        account_id: Uuid,
        current_password: String,
        new_password: String,
    },
    ChangeEmail {
        account_id: Uuid,
        password: String,
        new_email: String,
    },
    InviteUser {
        email: String,
        role: RoleName,
        profile: Profile,
        created_by: Option<Uuid>,
    },
    ResendInvite {
        account_id: Uuid,
    },
    ResetPasswordWithToken {
        token: String,
        new_password: String,
    },
    CreateAdminUser {
        username: Option<String>,
        email: String,
        password: String,
    },
    CreateUserDirect {
        email: String,
        password: String,
        role: RoleName,
        profile: Profile,
        created_by: Option<Uuid>,
    },
    UpdateUserStatus {
        account_id: Uuid,
        enabled: bool,
    },
    DeleteAccount {
        account_id: Uuid,
    },
}

/// Result of a dispatched command.
#[derive(Debug, Clone)]
pub enum CommandOutcome {
    /// Sign-in: the account plus its freshly issued session token.
    Authenticated(AuthenticatedAccount),
    /// Commands that create or mutate an account.
    Account(Account),
    /// Delete: whether an account was removed.
    Deleted(bool),
}

impl CommandOutcome {
    /// Unwraps the account carried by `Account` or `Authenticated` outcomes.
    pub fn into_account(self) -> Option<Account> {
        match self {
            Self::Account(account) => Some(account),
            Self::Authenticated(auth) => Some(auth.account),
            Self::Deleted(_) => None,
        }
    }
}
