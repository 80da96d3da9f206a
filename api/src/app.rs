//! Application state and factory.
//!
//! Builds the actix-web application with all routes and middleware. The
//! state is generic over the repository, hasher and outbound collaborators
//! so tests can wire in-memory implementations.

use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpResponse};

use crate::middleware::{auth::AuthResolver, cors::create_cors};
use crate::routes::auth::{reset_password::reset_password, sign_in::sign_in};
use crate::routes::users::{
    create::{create_admin, create_user},
    credentials::{change_email, change_password},
    invite::{invite_user, resend_invite},
    manage::{delete_user, update_status},
};

use iam_core::repositories::AccountRepository;
use iam_core::services::account::AccountService;
use iam_core::services::hashing::PasswordHasher;
use iam_core::services::outbound::{EventPublisher, NotificationDispatcher};
use iam_core::services::session::SessionTokenService;

/// Shared application state.
pub struct AppState<R, H, N, E>
where
    R: AccountRepository,
    H: PasswordHasher,
    N: NotificationDispatcher,
    E: EventPublisher,
{
    pub accounts: Arc<R>,
    pub account_service: Arc<AccountService<R, H, N, E>>,
    pub sessions: Arc<SessionTokenService>,
}

/// Creates the application with all routes and middleware wired up.
pub fn create_app<R, H, N, E>(
    app_state: web::Data<AppState<R, H, N, E>>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
>
where
    R: AccountRepository + 'static,
    H: PasswordHasher + 'static,
    N: NotificationDispatcher + 'static,
    E: EventPublisher + 'static,
{
    let resolver = AuthResolver::new(
        Arc::clone(&app_state.sessions),
        Arc::clone(&app_state.accounts) as Arc<dyn AccountRepository>,
    );
    let cors = create_cors();

    App::new()
        .app_data(app_state)
        .wrap(resolver)
        .wrap(cors)
        .wrap(Logger::default())
        .route("/health", web::get().to(health_check))
        .service(
            web::scope("/api/v1")
                .service(
                    web::scope("/auth")
                        .route("/sign-in", web::post().to(sign_in::<R, H, N, E>))
                        .route("/reset-password", web::post().to(reset_password::<R, H, N, E>)),
                )
                .service(
                    web::scope("/users")
                        .route("/invite", web::post().to(invite_user::<R, H, N, E>))
                        .route(
                            "/{id}/resend-invite",
                            web::post().to(resend_invite::<R, H, N, E>),
                        )
                        .route("/admin", web::post().to(create_admin::<R, H, N, E>))
                        .route("/{id}/status", web::patch().to(update_status::<R, H, N, E>))
                        .route(
                            "/{id}/change-password",
                            web::post().to(change_password::<R, H, N, E>),
                        )
                        .route(
                            "/{id}/change-email",
                            web::post().to(change_email::<R, H, N, E>),
                        )
                        .route("/{id}", web::delete().to(delete_user::<R, H, N, E>))
                        .route("", web::post().to(create_user::<R, H, N, E>)),
                ),
        )
        .default_service(web::route().to(not_found))
}

/// Health check endpoint handler.
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "fleet-iam",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({
        "error": "NOT_FOUND",
        "message": "The requested endpoint does not exist",
    }))
}
