//! Handler for POST /api/v1/auth/reset-password.

use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::app::AppState;
use crate::dto::auth_dto::ResetPasswordRequest;
use crate::dto::error_dto::{
    domain_error_response, validation_errors_response, validation_response,
};
use crate::dto::user_dto::UserResponse;

use iam_core::domain::commands::AccountCommand;
use iam_core::repositories::AccountRepository;
use iam_core::services::hashing::PasswordHasher;
use iam_core::services::outbound::{EventPublisher, NotificationDispatcher};

/// Redeems a single-use reset token and sets the new password. The account
/// becomes active; the token cannot be used again.
pub async fn reset_password<R, H, N, E>(
    state: web::Data<AppState<R, H, N, E>>,
    request: web::Json<ResetPasswordRequest>,
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
    if request.new_password != request.confirm_password {
        return validation_response("passwords do not match");
    }

    let command = AccountCommand::ResetPasswordWithToken {
        token: request.token.clone(),
        new_password: request.new_password.clone(),
    };

    match state.account_service.execute(command).await {
        Ok(outcome) => match outcome.into_account() {
            Some(account) => HttpResponse::Ok().json(UserResponse::from(account)),
            None => domain_error_response(&iam_core::errors::DomainError::internal(
                "reset produced an unexpected outcome",
            )),
        },
        Err(e) => domain_error_response(&e),
    }
}
