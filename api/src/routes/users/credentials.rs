//! Handlers for POST /api/v1/users/{id}/change-password and
//! POST /api/v1/users/{id}/change-email.
//!
//! Both re-verify the current credentials inside the command, so even an
//! admin caller must know the account's password to change it.

use actix_web::{web, HttpRequest, HttpResponse};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::dto::error_dto::{domain_error_response, validation_errors_response};
use crate::dto::user_dto::{ChangeEmailRequest, ChangePasswordRequest, UserResponse};

use iam_core::domain::commands::AccountCommand;
use iam_core::repositories::AccountRepository;
use iam_core::services::hashing::PasswordHasher;
use iam_core::services::outbound::{EventPublisher, NotificationDispatcher};

use super::require_self_or_admin;

pub async fn change_password<R, H, N, E>(
    req: HttpRequest,
    state: web::Data<AppState<R, H, N, E>>,
    path: web::Path<Uuid>,
    request: web::Json<ChangePasswordRequest>,
) -> HttpResponse
where
    R: AccountRepository + 'static,
    H: PasswordHasher + 'static,
    N: NotificationDispatcher + 'static,
    E: EventPublisher + 'static,
{
    let account_id = path.into_inner();
    if let Err(response) =
        require_self_or_admin(&req, state.accounts.as_ref(), account_id).await
    {
        return response;
    }
    if let Err(errors) = request.validate() {
        return validation_errors_response(&errors);
    }

    let command = AccountCommand::ChangePassword {
        account_id,
        current_password: request.current_password.clone(),
        new_password: request.new_password.clone(),
    };
    match state.account_service.execute(command).await {
        Ok(outcome) => match outcome.into_account() {
            Some(account) => HttpResponse::Ok().json(UserResponse::from(account)),
            None => domain_error_response(&iam_core::errors::DomainError::internal(
                "password change produced an unexpected outcome",
            )),
        },
        Err(e) => domain_error_response(&e),
    }
}

pub async fn change_email<R, H, N, E>(
    req: HttpRequest,
    state: web::Data<AppState<R, H, N, E>>,
    path: web::Path<Uuid>,
    request: web::Json<ChangeEmailRequest>,
) -> HttpResponse
where
    R: AccountRepository + 'static,
    H: PasswordHasher + 'static,
    N: NotificationDispatcher + 'static,
    E: EventPublisher + 'static,
{
    let account_id = path.into_inner();
    if let Err(response) =
        require_self_or_admin(&req, state.accounts.as_ref(), account_id).await
    {
        return response;
    }
    if let Err(errors) = request.validate() {
        return validation_errors_response(&errors);
    }

    let command = AccountCommand::ChangeEmail {
        account_id,
        password: request.password.clone(),
        new_email: request.new_email.clone(),
    };
    match state.account_service.execute(command).await {
        Ok(outcome) => match outcome.into_account() {
            Some(account) => HttpResponse::Ok().json(UserResponse::from(account)),
            None => domain_error_response(&iam_core::errors::DomainError::internal(
                "email change produced an unexpected outcome",
            )),
        },
        Err(e) => domain_error_response(&e),
    }
}
