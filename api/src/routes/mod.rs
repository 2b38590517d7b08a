//! HTTP route handlers
//!
//! - `auth` - registration, verification, sessions, profile, password reset
//! - `posts` - post management for the signed-in author, public post pages
//! - `search` - faceted search over published posts

pub mod auth;
pub mod posts;
pub mod search;

use std::sync::Arc;

use actix_web::{http::header::USER_AGENT, HttpRequest};

use sigma_core::{
    AuthService, DeviceInfo, MailServiceTrait, PostRepository, PostService, SessionRepository,
    TokenService, UserRepository,
};

use auth::cookie::RefreshCookie;

/// Application state shared by all handlers
pub struct AppState<U, S, P, M>
where
    U: UserRepository + 'static,
    S: SessionRepository + 'static,
    P: PostRepository + 'static,
    M: MailServiceTrait + 'static,
{
    pub auth_service: Arc<AuthService<U, S, M>>,
    pub post_service: Arc<PostService<P, U>>,
    /// Verifies access tokens in [`crate::middleware::JwtAuth`]
    pub token_service: Arc<TokenService>,
    pub refresh_cookie: RefreshCookie,
}

/// Device details of the client sending `req`
pub(crate) fn device_info(req: &HttpRequest) -> DeviceInfo {
    req.headers()
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(DeviceInfo::from_user_agent)
        .unwrap_or_default()
}
