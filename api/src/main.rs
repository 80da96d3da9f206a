//! Server entry point: wires configuration, persistence, services and the
//! HTTP application together.

use std::sync::Arc;

use actix_web::{web, HttpServer};
use async_trait::async_trait;
use dotenvy::dotenv;
use log::info;
use uuid::Uuid;

use iam_api::app::{create_app, AppState};
use iam_api::bootstrap::seed_admin;
use iam_api::config::Settings;

use iam_core::errors::DomainResult;
use iam_core::services::account::{AccountService, AccountServiceConfig};
use iam_core::services::hashing::BcryptPasswordHasher;
use iam_core::services::outbound::{EventPublisher, NoopEventPublisher};
use iam_core::services::session::{SessionTokenConfig, SessionTokenService};

use iam_infra::database::{DatabasePool, MySqlAccountRepository};
use iam_infra::events::WebhookEventPublisher;
use iam_infra::notifications::OutboxMailer;

/// Event sink chosen at startup: webhook when an endpoint is configured,
/// otherwise a no-op that only logs.
enum EventSink {
    Webhook(WebhookEventPublisher),
    Noop(NoopEventPublisher),
}

#[async_trait]
impl EventPublisher for EventSink {
    async fn publish_account_created(&self, account_id: Uuid, email: &str) -> DomainResult<()> {
        match self {
            Self::Webhook(publisher) => publisher.publish_account_created(account_id, email).await,
            Self::Noop(publisher) => publisher.publish_account_created(account_id, email).await,
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting FleetOS identity service");

    let settings = Settings::from_env()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;

    let pool = DatabasePool::new(settings.database.clone())
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::ConnectionRefused, e.to_string()))?;

    let accounts = Arc::new(MySqlAccountRepository::new(pool.get_pool().clone()));
    let hasher = Arc::new(BcryptPasswordHasher::new());
    let sessions = Arc::new(SessionTokenService::new(
        SessionTokenConfig::new(settings.auth.jwt_secret.clone())
            .with_ttl(settings.auth.session_ttl),
    ));
    let notifications = Arc::new(OutboxMailer::new(
        &settings.mail.outbox_dir,
        &settings.mail.frontend_base_url,
    ));
    let events = Arc::new(match &settings.events_endpoint {
        Some(endpoint) => {
            info!("account events will be delivered to {endpoint}");
            EventSink::Webhook(
                WebhookEventPublisher::new(endpoint.clone()).map_err(|e| {
                    std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
                })?,
            )
        }
        None => {
            info!("no event endpoint configured, account events will be dropped");
            EventSink::Noop(NoopEventPublisher)
        }
    });

    let account_service = Arc::new(AccountService::new(
        Arc::clone(&accounts),
        hasher,
        Arc::clone(&sessions),
        notifications,
        events,
        AccountServiceConfig {
            invite_token_ttl: settings.auth.invite_token_ttl,
            ..AccountServiceConfig::default()
        },
    ));

    seed_admin(account_service.as_ref(), settings.superadmin.as_ref()).await;

    let bind_address = format!("{}:{}", settings.server.host, settings.server.port);
    info!("Server will bind to: {bind_address}");

    let app_state = web::Data::new(AppState {
        accounts,
        account_service,
        sessions,
    });

    HttpServer::new(move || create_app(app_state.clone()))
        .bind(&bind_address)?
        .run()
        .await
}
