//! Token service module for JWT management
//!
//! Three HS256 token kinds share one service:
//! - access tokens authenticate API calls
//! - refresh tokens point at a login session and its current code
//! - verification tokens point at a pending email verification code

mod config;
mod service;

#[cfg(test)]
mod tests;

pub use config::TokenServiceConfig;
pub use service::TokenService;
