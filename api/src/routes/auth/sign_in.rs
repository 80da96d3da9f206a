//! Handler for POST /api/v1/auth/sign-in.

use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::app::AppState;
use crate::dto::auth_dto::{SignInRequest, SignInResponse};
use crate::dto::error_dto::{domain_error_response, validation_errors_response};

use iam_core::domain::commands::{AccountCommand, CommandOutcome};
use iam_core::repositories::AccountRepository;
use iam_core::services::hashing::PasswordHasher;
use iam_core::services::outbound::{EventPublisher, NotificationDispatcher};

/// Authenticates with email and password, returning the account summary
/// and a session token.
pub async fn sign_in<R, H, N, E>(
    state: web::Data<AppState<R, H, N, E>>,
    request: web::Json<SignInRequest>,
) -> HttpResponse
where
    R: AccountRepository + 'static,
    H: PasswordHasher + 'static,
    N: NotificationDispatcher + 'static,
    E: EventPublisher + 'static,
{
    if let Err(errors) = request.validate() {
        return validation_errors_response(&errors);
    }

    let command = AccountCommand::SignIn {
        email: request.email.clone(),
        password: request.password.clone(),
    };

    match state.account_service.execute(command).await {
        Ok(CommandOutcome::Authenticated(auth)) => {
            HttpResponse::Ok().json(SignInResponse::from(auth))
        }
        Ok(_) => domain_error_response(&iam_core::errors::DomainError::internal(
            "sign-in produced an unexpected outcome",
        )),
        Err(e) => domain_error_response(&e),
    }
}
