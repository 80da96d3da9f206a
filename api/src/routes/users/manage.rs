//! Handlers for PATCH /api/v1/users/{id}/status and
//! DELETE /api/v1/users/{id}.

use actix_web::{web, HttpRequest, HttpResponse};
use uuid::Uuid;

use crate::app::AppState;
use crate::dto::error_dto::domain_error_response;
use crate::dto::user_dto::{DeleteResponse, UpdateStatusRequest, UserResponse};

use iam_core::domain::commands::{AccountCommand, CommandOutcome};
use iam_core::repositories::AccountRepository;
use iam_core::services::hashing::PasswordHasher;
use iam_core::services::outbound::{EventPublisher, NotificationDispatcher};

use super::require_admin;

/// Enables or disables an account.
pub async fn update_status<R, H, N, E>(
    req: HttpRequest,
    state: web::Data<AppState<R, H, N, E>>,
    path: web::Path<Uuid>,
    request: web::Json<UpdateStatusRequest>,
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

    let command = AccountCommand::UpdateUserStatus {
        account_id: path.into_inner(),
        enabled: request.enabled,
    };
    match state.account_service.execute(command).await {
        Ok(outcome) => match outcome.into_account() {
            Some(account) => HttpResponse::Ok().json(UserResponse::from(account)),
            None => domain_error_response(&iam_core::errors::DomainError::internal(
                "status update produced an unexpected outcome",
            )),
        },
        Err(e) => domain_error_response(&e),
    }
}

/// Deletes an account. Responds with whether anything was removed.
pub async fn delete_user<R, H, N, E>(
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

    let command = AccountCommand::DeleteAccount { account_id: path.into_inner() };
    match state.account_service.execute(command).await {
        Ok(CommandOutcome::Deleted(deleted)) => {
            HttpResponse::Ok().json(DeleteResponse { deleted })
        }
        Ok(_) => domain_error_response(&iam_core::errors::DomainError::internal(
            "delete produced an unexpected outcome",
        )),
        Err(e) => domain_error_response(&e),
    }
}
