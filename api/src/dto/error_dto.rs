//! Error response body and the domain-error to HTTP-status mapping.

use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use iam_core::errors::{AuthError, DomainError};

/// Error body returned on every failure path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Stable machine-readable code.
    pub error: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self { error: error.into(), message: message.into(), timestamp: Utc::now() }
    }

    pub fn to_response(&self, status: StatusCode) -> HttpResponse {
        HttpResponse::build(status).json(self)
    }
}

/// Maps a domain error to its HTTP status.
pub fn status_of(error: &DomainError) -> StatusCode {
    match error {
        DomainError::Validation { .. } => StatusCode::BAD_REQUEST,
        DomainError::Token(_) => StatusCode::BAD_REQUEST,
        DomainError::Auth(AuthError::InvalidCredentials) => StatusCode::UNAUTHORIZED,
        DomainError::Auth(AuthError::AccountNotActivated) => StatusCode::FORBIDDEN,
        DomainError::Auth(AuthError::AccountDisabled) => StatusCode::FORBIDDEN,
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::Conflict { .. } => StatusCode::CONFLICT,
        DomainError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Builds the full HTTP response for a domain error.
pub fn domain_error_response(error: &DomainError) -> HttpResponse {
    let status = status_of(error);
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        log::error!("internal error surfaced to the API boundary: {error}");
        // Internal details stay in the logs.
        return ErrorResponse::new(error.code(), "Internal server error").to_response(status);
    }
    ErrorResponse::new(error.code(), error.to_string()).to_response(status)
}

/// 400 with a free-form validation message.
pub fn validation_response(message: impl Into<String>) -> HttpResponse {
    ErrorResponse::new("VALIDATION_ERROR", message).to_response(StatusCode::BAD_REQUEST)
}

/// 400 listing the fields that failed request validation.
pub fn validation_errors_response(errors: &validator::ValidationErrors) -> HttpResponse {
    let mut fields: Vec<&str> = errors.field_errors().keys().copied().collect();
    fields.sort_unstable();
    validation_response(format!("invalid fields: {}", fields.join(", ")))
}

/// 401 for endpoints that require a resolved identity.
pub fn unauthenticated_response() -> HttpResponse {
    ErrorResponse::new("UNAUTHENTICATED", "Authentication required")
        .to_response(StatusCode::UNAUTHORIZED)
}

/// 403 for callers without the required role.
pub fn forbidden_response() -> HttpResponse {
    ErrorResponse::new("FORBIDDEN", "Insufficient permissions")
        .to_response(StatusCode::FORBIDDEN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use iam_core::errors::TokenError;

    #[test]
    fn statuses_follow_the_error_contract() {
        assert_eq!(status_of(&DomainError::validation("x")), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(&TokenError::Expired.into()), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(&AuthError::InvalidCredentials.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(status_of(&AuthError::AccountDisabled.into()), StatusCode::FORBIDDEN);
        assert_eq!(
            status_of(&DomainError::NotFound { resource: "account".into() }),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(&DomainError::Conflict { field: "email".into() }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(&DomainError::internal("boom")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
