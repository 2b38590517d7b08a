//! Authentication service module
//!
//! This module provides the account lifecycle:
//! - Client and agent registration with email verification
//! - Login, refresh token rotation and logout
//! - Agent profile updates
//! - Password reset through a mailed one-time code

mod config;
mod service;


pub use config::AuthServiceConfig;
pub use service::{AuthService, LoginResult, RefreshResult, VerificationOutcome};
