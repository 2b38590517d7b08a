//! Domain entities representing core business objects.

pub mod code;
pub mod post;
pub mod session;
pub mod token;
pub mod user;


// Re-export commonly used types
pub use code::{PasswordCode, VerificationCode, PASSWORD_CODE_LENGTH};
pub use post::{
    Contact, Currency, DetailsPatch, Features, Frequency, NewPost, Post, PostChanges, PostDetails, PostType,
    Property, MAX_DESCRIPTION_LENGTH, MAX_IMAGES, MAX_PRICE,
};
pub use session::Session;
pub use token::{AccessClaims, SessionClaims, TokenKind};
pub use user::{AgentProfile, AgentProfileUpdate, User, UserType};
