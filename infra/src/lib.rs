//! # Infrastructure Layer
//!
//! Concrete implementations of the identity service's outbound seams:
//! MySQL persistence for accounts, the file-based mail outbox and the
//! webhook event publisher.

pub mod database;
pub mod events;
pub mod notifications;

/// Configuration for infrastructure services.
pub mod config {
    use serde::{Deserialize, Serialize};

    /// Database configuration.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct DatabaseConfig {
        /// Database connection URL.
        pub url: String,
        /// Maximum number of connections in the pool.
        pub max_connections: u32,
        /// Connection timeout in seconds.
        pub connect_timeout: u64,
    }

    impl Default for DatabaseConfig {
        fn default() -> Self {
            Self {
                url: "mysql://localhost:3306/fleet_iam".to_string(),
                max_connections: 10,
                connect_timeout: 30,
            }
        }
    }
}

/// Infrastructure-specific error types.
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}
