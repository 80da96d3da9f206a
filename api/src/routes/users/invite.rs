//! Handlers for POST /api/v1/users/invite and
//! POST /api/v1/users/{id}/resend-invite.

use actix_web::{web, HttpRequest, HttpResponse};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::dto::error_dto::{domain_error_response, validation_errors_response};
use crate::dto::user_dto::{InviteUserRequest, UserResponse};

use iam_core::domain::commands::AccountCommand;
use iam_core::repositories::AccountRepository;
use iam_core::services::hashing::PasswordHasher;
use iam_core::services::outbound::{EventPublisher, NotificationDispatcher};

use super::{caller_account_id, parse_role, require_admin};

/// Invites a user by email. Repeat invitations refresh the account and
/// re-issue the activation token.
pub async fn invite_user<R, H, N, E>(
    req: HttpRequest,
    state: web::Data<AppState<R, H, N, E>>,
    request: web::Json<InviteUserRequest>,
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
    let command = AccountCommand::InviteUser {
        email: request.email.clone(),
        role,
        profile: request.profile.clone().into(),
        created_by,
    };

    match state.account_service.execute(command).await {
        Ok(outcome) => match outcome.into_account() {
            Some(account) => HttpResponse::Ok().json(UserResponse::from(account)),
            None => domain_error_response(&iam_core::errors::DomainError::internal(
                "invite produced an unexpected outcome",
            )),
        },
        Err(e) => domain_error_response(&e),
    }
}

/// Re-issues the activation token and email for an invited account.
pub async fn resend_invite<R, H, N, E>(
    req: HttpRequest,
    state: web::Data<AppState<R, H, N, E>>,
    path: web::Path<Uuid>,
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

    let command = AccountCommand::ResendInvite { account_id: path.into_inner() };
    match state.account_service.execute(command).await {
        Ok(outcome) => match outcome.into_account() {
            Some(account) => HttpResponse::Ok().json(UserResponse::from(account)),
            None => domain_error_response(&iam_core::errors::DomainError::internal(
                "resend produced an unexpected outcome",
            )),
        },
        Err(e) => domain_error_response(&e),
    }
}
