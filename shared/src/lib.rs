//! Shared utilities and common types for the Sigma server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types
//! - Error response structures
//! - Field-level validation errors
//! - Pagination and response envelopes

pub mod config;
pub mod errors;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, AuthConfig, CookieConfig, CorsConfig, DatabaseConfig, Environment, JwtConfig,
    LoggingConfig, MailConfig, ServerConfig,
};
pub use errors::{error_codes, ErrorResponse};
pub use types::{HealthResponse, OkResponse, Pagination, SuccessResponse};
pub use utils::validation::{FieldError, ValidationErrors};
