//! # Infrastructure Layer
//!
//! Concrete implementations of the traits declared by `sigma_core`:
//!
//! - **Database**: MySQL repositories using SQLx, the connection pool and
//!   the embedded migrations
//! - **Mail**: verification links and password codes, either written to the
//!   log or delivered through an HTTP mail relay

/// Database module - MySQL implementations using SQLx
pub mod database;

/// Mail delivery
pub mod mail;

pub use database::{
    DatabasePool, MySqlPostRepository, MySqlSessionRepository, MySqlUserRepository,
    PoolStatistics,
};
pub use mail::{create_mail_service, HttpMailService, LogMailService, MailService};

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failure on startup
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// HTTP request error for external services
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Mail delivery error
    #[error("Mail service error: {0}")]
    Mail(String),
}
