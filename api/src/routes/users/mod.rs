//! User management endpoints. All of them require a resolved identity;
//! most require the admin role.

pub mod create;
pub mod credentials;
pub mod invite;
pub mod manage;

use actix_web::{HttpRequest, HttpResponse};
use uuid::Uuid;

use crate::dto::error_dto::{
    domain_error_response, forbidden_response, unauthenticated_response, validation_response,
};
use crate::middleware::auth::{identity, RequestIdentity};

use iam_core::domain::entities::RoleName;
use iam_core::repositories::AccountRepository;

/// Admits only authenticated admins.
pub(crate) fn require_admin(req: &HttpRequest) -> Result<RequestIdentity, HttpResponse> {
    match identity(req) {
        None => Err(unauthenticated_response()),
        Some(id) if !id.is_admin() => Err(forbidden_response()),
        Some(id) => Ok(id),
    }
}

/// Admits admins, and otherwise only the owner of the target account.
pub(crate) async fn require_self_or_admin<R: AccountRepository>(
    req: &HttpRequest,
    accounts: &R,
    target: Uuid,
) -> Result<RequestIdentity, HttpResponse> {
    let Some(caller) = identity(req) else {
        return Err(unauthenticated_response());
    };
    if caller.is_admin() {
        return Ok(caller);
    }
    match accounts.find_by_id(target).await {
        Ok(Some(account)) if account.email == caller.email => Ok(caller),
        Ok(_) => Err(forbidden_response()),
        Err(e) => Err(domain_error_response(&e)),
    }
}

pub(crate) fn parse_role(value: &str) -> Result<RoleName, HttpResponse> {
    RoleName::parse(value).ok_or_else(|| validation_response(format!("unknown role: {value}")))
}

/// Resolves the caller's account id for provenance fields. Best effort:
/// trusted-header identities may not map to a stored account.
pub(crate) async fn caller_account_id<R: AccountRepository>(
    accounts: &R,
    caller: &RequestIdentity,
) -> Option<Uuid> {
    accounts
        .find_by_email(&caller.email)
        .await
        .ok()
        .flatten()
        .map(|account| account.id)
}
