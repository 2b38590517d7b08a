//! # Sigma Core
//!
//! Core business logic and domain layer for the Sigma classifieds backend.
//! This crate contains domain entities, request schemas, business services,
//! repository interfaces, and error types that form the foundation of the
//! application architecture.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;
pub mod validation;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::{PostRepository, SessionRepository, UserRepository};
pub use services::{
    AuthService, AuthServiceConfig, LoginResult, MailServiceTrait, PostService, RefreshResult,
    TokenService, TokenServiceConfig, VerificationOutcome,
};
