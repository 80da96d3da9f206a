//! Handlers for POST /api/v1/users/admin and POST /api/v1/users.

use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use crate::app::AppState;
use crate::dto::error_dto::{domain_error_response, validation_errors_response};
use crate::dto::user_dto::{CreateAdminRequest, CreateUserRequest, UserResponse};

use iam_core::domain::commands::AccountCommand;
use iam_core::repositories::AccountRepository;
use iam_core::services::hashing::PasswordHasher;
use iam_core::services::outbound::{EventPublisher, NotificationDispatcher};

use super::{caller_account_id, parse_role, require_admin};

/// Creates an active administrator account.
pub async fn create_admin<R, H, N, E>(
    req: HttpRequest,
    state: web::Data<AppState<R, H, N, E>>,
    request: web::Json<CreateAdminRequest>,
) -> HttpResponse
where
    R: AccountRepository + 'static,
    H: PasswordHasher + 'static,
    N: NotificationDispatcher + 'static,
    E: EventPublisher + 'static,
{
    if let Err(response) = require_admin(&req) {
        return response;
    }
    if let Err(errors) = request.validate() {
        return validation_errors_response(&errors);
    }

    let command = AccountCommand::CreateAdminUser {
        username: request.username.clone(),
        email: request.email.clone(),
        password: request.password.clone(),
    };

    match state.account_service.execute(command).await {
        Ok(outcome) => match outcome.into_account() {
            Some(account) => HttpResponse::Created().json(UserResponse::from(account)),
            None => domain_error_response(&iam_core::errors::DomainError::internal(
                "create produced an unexpected outcome",
            )),
        },
        Err(e) => domain_error_response(&e),
    }
}

/// Creates an active carrier or driver account with a known password,
/// bypassing the invitation flow.
pub async fn create_user<R, H, N, E>(
    req: HttpRequest,
    state: web::Data<AppState<R, H, N, E>>,
    request: web::Json<CreateUserRequest>,
) -> HttpResponse
where
    R: AccountRepository + 'static,
    H: PasswordHasher + 'static,
    N: NotificationDispatcher + 'static,
    E: EventPublisher + 'static,
{
    let caller = match require_admin(&req) {
        Ok(caller) => caller,
        Err(response) => return response,
    };
    if let Err(errors) = request.validate() {
        return validation_errors_response(&errors);
    }
    let role = match parse_role(&request.role) {
        Ok(role) => role,
        Err(response) => return response,
    };

    let created_by = caller_account_id(state.accounts.as_ref(), &caller).await;
    let command = AccountCommand::CreateUserDirect {
        email: request.email.clone(),
        password: request.password.clone(),
        role,
        profile: request.profile.clone().into(),
        created_by,
    };

    match state.account_service.execute(command).await {
        Ok(outcome) => match outcome.into_account() {
            Some(account) => HttpResponse::Created().json(UserResponse::from(account)),
            None => domain_error_response(&iam_core::errors::DomainError::internal(
                "create produced an unexpected outcome",
            )),
        },
        Err(e) => domain_error_response(&e),
    }
}
