//! Domain-specific error types and error handling.
//!
//! Error messages are deliberately stable: the presentation layer maps each
//! variant to an HTTP status and a machine-readable code via [`DomainError::code`].

use thiserror::Error;

/// Authentication and account-eligibility errors.
///
/// `InvalidCredentials` carries the same message for an unknown email and a
/// wrong password so callers cannot enumerate accounts.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Account not activated - check your email to set a password")]
    AccountNotActivated,

    #[error("Account disabled")]
    AccountDisabled,
}

/// Single-use reset/activation token errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token expired")]
    Expired,

    #[error("Token already used")]
    AlreadyUsed,

    #[error("Invalid token")]
    Invalid,
}

/// Core domain errors.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Conflict: {field} already in use")]
    Conflict { field: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Token(#[from] TokenError),
}

impl DomainError {
    /// Convenience constructor for validation failures.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into() }
    }

    /// Convenience constructor for unexpected storage or runtime failures.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    /// Stable error code surfaced at the command boundary.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Conflict { .. } => "CONFLICT",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Internal { .. } => "INTERNAL_ERROR",
            Self::Auth(AuthError::InvalidCredentials) => "INVALID_CREDENTIALS",
            Self::Auth(AuthError::AccountNotActivated) => "ACCOUNT_NOT_ACTIVATED",
            Self::Auth(AuthError::AccountDisabled) => "ACCOUNT_DISABLED",
            Self::Token(TokenError::Expired) => "TOKEN_EXPIRED",
            Self::Token(TokenError::AlreadyUsed) => "TOKEN_ALREADY_USED",
            Self::Token(TokenError::Invalid) => "TOKEN_INVALID",
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
