//! Business services containing domain logic and use cases.

pub mod auth;
pub mod mail;
pub mod post;
pub mod token;

// Re-export commonly used types
pub use auth::{AuthService, AuthServiceConfig, LoginResult, RefreshResult, VerificationOutcome};
pub use mail::MailServiceTrait;
pub use post::PostService;
pub use token::{TokenService, TokenServiceConfig};

#[cfg(any(test, feature = "testing"))]
pub use mail::{MockMailService, SentMail};
