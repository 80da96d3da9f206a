//! Environment-driven configuration for the API server.

use std::env;

use chrono::Duration;
use iam_infra::config::DatabaseConfig;

/// All settings the server needs, loaded from environment variables with
/// defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseConfig,
    pub auth: AuthSettings,
    pub mail: MailSettings,
    /// Webhook endpoint for account lifecycle events. Absent means events
    /// are logged and dropped.
    pub events_endpoint: Option<String>,
    pub superadmin: Option<SuperadminSettings>,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub session_ttl: Duration,
    pub invite_token_ttl: Duration,
}

#[derive(Debug, Clone)]
pub struct MailSettings {
    pub outbox_dir: String,
    pub frontend_base_url: String,
}

/// Seeded admin credentials. The account is created or refreshed on boot.
#[derive(Debug, Clone)]
pub struct SuperadminSettings {
    pub username: Option<String>,
    pub email: String,
    pub password: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {variable}: {message}")]
    Invalid { variable: String, message: String },
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T: std::str::FromStr>(name: &str, default: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    var_or(name, default).parse::<T>().map_err(|e| ConfigError::Invalid {
        variable: name.to_string(),
        message: e.to_string(),
    })
}

impl Settings {
    /// Loads settings from the environment.
    ///
    /// `SUPERADMIN_EMAIL` and `SUPERADMIN_PASSWORD` must both be present
    /// for seeding; a lone value is ignored with a warning at boot.
    pub fn from_env() -> Result<Self, ConfigError> {
        let superadmin = match (env::var("SUPERADMIN_EMAIL"), env::var("SUPERADMIN_PASSWORD")) {
            (Ok(email), Ok(password)) if !email.is_empty() && !password.is_empty() => {
                Some(SuperadminSettings {
                    username: env::var("SUPERADMIN_USERNAME").ok().filter(|v| !v.is_empty()),
                    email,
                    password,
                })
            }
            _ => None,
        };

        Ok(Self {
            server: ServerSettings {
                host: var_or("SERVER_HOST", "127.0.0.1"),
                port: parse_var("SERVER_PORT", "8080")?,
            },
            database: DatabaseConfig {
                url: var_or("DATABASE_URL", "mysql://localhost:3306/fleet_iam"),
                max_connections: parse_var("DATABASE_MAX_CONNECTIONS", "10")?,
                connect_timeout: parse_var("DATABASE_CONNECT_TIMEOUT", "30")?,
            },
            auth: AuthSettings {
                jwt_secret: var_or("JWT_SECRET", "change-me-in-production"),
                session_ttl: Duration::hours(parse_var("SESSION_TTL_HOURS", "24")?),
                invite_token_ttl: Duration::minutes(parse_var("INVITE_TOKEN_TTL_MINUTES", "90")?),
            },
            mail: MailSettings {
                outbox_dir: var_or("MAIL_OUTBOX_DIR", "./outbox"),
                frontend_base_url: var_or("FRONTEND_BASE_URL", "http://localhost:3000"),
            },
            events_endpoint: env::var("EVENTS_WEBHOOK_URL").ok().filter(|v| !v.is_empty()),
            superadmin,
        })
    }
}
