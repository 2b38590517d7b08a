//! Domain-specific error types for authentication, tokens and posts
//!
//! The `Display` strings double as the user-facing messages returned by the api.

use thiserror::Error;

use crate::domain::entities::token::TokenKind;

/// Authentication and account errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("User not found")]
    UserNotFound,

    #[error("User exists already")]
    UserAlreadyExists,

    #[error("This account is verified already")]
    AlreadyVerified,

    #[error("Bad credentials")]
    InvalidCredentials,

    #[error("User is not an agent")]
    NotAnAgent,

    #[error("Code validation fails")]
    PasswordCodeRejected,

    #[error("Unable to reset the password")]
    PasswordResetRejected,
}

/// Token-related errors, tagged with the token kind
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Missing {0} token")]
    Missing(TokenKind),

    #[error("Invalid {0} token")]
    Invalid(TokenKind),

    #[error("The {0} token has expired")]
    Expired(TokenKind),

    #[error("Token generation failed")]
    GenerationFailed,
}

/// Post errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PostError {
    #[error("Post not found")]
    NotFound,

    #[error("You are not the author of this post")]
    NotAuthor,

    #[error("Max post length reached")]
    MaxPostLength { limit: usize },

    #[error("The post type cannot be changed")]
    TypeMismatch,
}
