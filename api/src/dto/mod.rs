//! Request and response bodies of the HTTP api

pub mod auth;
pub mod post;
pub mod user;

pub use auth::{AccessTokenResponse, LoginResponse, UserEnvelope, VerificationPage};
pub use post::{PostDto, PostEnvelope, PostIdResponse, PostsEnvelope};
pub use user::UserDto;
