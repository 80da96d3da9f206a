//! Authentication resolver middleware.
//!
//! Runs on every request and tries to establish who is calling, in order:
//!
//! 1. `X-User-Email` + `X-User-Roles` headers (both required): identity
//!    asserted by the trusted platform gateway, taken at face value;
//! 2. `Authorization: Bearer` session token: validated locally, then the
//!    subject is resolved to an account for its current roles;
//! 3. neither: the request stays unauthenticated.
//!
//! The resolver never rejects a request. Handlers decide what an absent or
//! insufficient identity means for their endpoint.

use std::collections::BTreeSet;
use std::{
    future::{ready, Ready},
    rc::Rc,
    sync::Arc,
    task::{Context, Poll},
};

use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    Error, HttpMessage, HttpRequest,
};
use futures_util::future::LocalBoxFuture;

use iam_core::domain::entities::RoleName;
use iam_core::repositories::AccountRepository;
use iam_core::services::session::SessionTokenService;

const USER_EMAIL_HEADER: &str = "X-User-Email";
const USER_ROLES_HEADER: &str = "X-User-Roles";

/// Where a request identity came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentitySource {
    /// Asserted by the gateway via trusted headers.
    TrustedHeader,
    /// Derived from a locally validated session token.
    SessionToken,
}

/// Caller identity injected into request extensions.
#[derive(Debug, Clone)]
pub struct RequestIdentity {
    pub email: String,
    pub roles: BTreeSet<RoleName>,
    pub source: IdentitySource,
}

impl RequestIdentity {
    pub fn is_admin(&self) -> bool {
        self.roles.contains(&RoleName::Admin)
    }
}

/// Reads the resolved identity off a request, if any.
pub fn identity(req: &HttpRequest) -> Option<RequestIdentity> {
    req.extensions().get::<RequestIdentity>().cloned()
}

/// Authentication resolver middleware factory.
#[derive(Clone)]
pub struct AuthResolver {
    sessions: Arc<SessionTokenService>,
    accounts: Arc<dyn AccountRepository>,
}

impl AuthResolver {
    pub fn new(sessions: Arc<SessionTokenService>, accounts: Arc<dyn AccountRepository>) -> Self {
        Self { sessions, accounts }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthResolver
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthResolverMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthResolverMiddleware {
            service: Rc::new(service),
            sessions: Arc::clone(&self.sessions),
            accounts: Arc::clone(&self.accounts),
        }))
    }
}

pub struct AuthResolverMiddleware<S> {
    service: Rc<S>,
    sessions: Arc<SessionTokenService>,
    accounts: Arc<dyn AccountRepository>,
}

impl<S, B> Service<ServiceRequest> for AuthResolverMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let sessions = Arc::clone(&self.sessions);
        let accounts = Arc::clone(&self.accounts);

        Box::pin(async move {
            // Insert at most once; an identity placed by an earlier layer wins.
            let already_resolved = req.extensions().get::<RequestIdentity>().is_some();
            if !already_resolved {
                if let Some(resolved) = resolve(&req, &sessions, accounts.as_ref()).await {
                    req.extensions_mut().insert(resolved);
                }
            }
            service.call(req).await
        })
    }
}

async fn resolve(
    req: &ServiceRequest,
    sessions: &SessionTokenService,
    accounts: &dyn AccountRepository,
) -> Option<RequestIdentity> {
    // Stage 1: trusted gateway headers.
    if let Some(identity) = from_trusted_headers(req) {
        return Some(identity);
    }
    // Stage 2: bearer session token.
    from_bearer_token(req, sessions, accounts).await
}

fn from_trusted_headers(req: &ServiceRequest) -> Option<RequestIdentity> {
    let email = header_value(req, USER_EMAIL_HEADER)?;
    let roles_header = header_value(req, USER_ROLES_HEADER)?;

    let roles: BTreeSet<RoleName> =
        roles_header.split(',').map(str::trim).filter_map(RoleName::parse).collect();

    log::debug!("resolved {email} from trusted headers ({} roles)", roles.len());
    Some(RequestIdentity { email, roles, source: IdentitySource::TrustedHeader })
}

async fn from_bearer_token(
    req: &ServiceRequest,
    sessions: &SessionTokenService,
    accounts: &dyn AccountRepository,
) -> Option<RequestIdentity> {
    let token = extract_bearer_token(req)?;

    let email = match sessions.subject_of(&token) {
        Ok(subject) => subject,
        Err(e) => {
            log::debug!("rejected session token: {e}");
            return None;
        }
    };

    match accounts.find_by_email(&email).await {
        Ok(Some(account)) => Some(RequestIdentity {
            email: account.email,
            roles: account.roles,
            source: IdentitySource::SessionToken,
        }),
        Ok(None) => {
            log::warn!("session token for unknown account {email}");
            None
        }
        Err(e) => {
            log::error!("account lookup failed while resolving identity: {e}");
            None
        }
    }
}

fn header_value(req: &ServiceRequest, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

fn extract_bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}
