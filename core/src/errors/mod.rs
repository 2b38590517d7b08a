//! Domain-specific error types and error handling.

mod types;

pub use types::{AuthError, PostError, TokenError};
pub use sigma_shared::utils::validation::{FieldError, ValidationErrors};

use thiserror::Error;

/// Core domain errors (general purpose)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    /// An image or avatar above the 5MB cap; `index` locates post images
    #[error("File exceeds the maximum allowed size of 5MB")]
    FileTooLarge { index: Option<usize> },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Post(#[from] PostError),

    #[error("Invalid or missing required parameters: {0}")]
    Validation(#[from] ValidationErrors),
}

impl DomainError {
    /// Shorthand for an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        DomainError::Internal {
            message: message.into(),
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::token::TokenKind;

    #[test]
    fn test_from_conversions() {
        let err: DomainError = AuthError::InvalidCredentials.into();
        assert!(matches!(err, DomainError::Auth(AuthError::InvalidCredentials)));

        let err: DomainError = TokenError::Expired(TokenKind::Refresh).into();
        assert_eq!(err.to_string(), "The refresh token has expired");

        let err: DomainError = ValidationErrors::single("email", "Must be a valid email").into();
        assert!(err.to_string().contains("email: Must be a valid email"));
    }

    #[test]
    fn test_messages() {
        assert_eq!(AuthError::UserAlreadyExists.to_string(), "User exists already");
        assert_eq!(PostError::NotFound.to_string(), "Post not found");
        assert_eq!(
            DomainError::FileTooLarge { index: Some(2) }.to_string(),
            "File exceeds the maximum allowed size of 5MB"
        );
    }
}
