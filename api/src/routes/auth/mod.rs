//! Authentication route handlers
//!
//! This module contains all account endpoints:
//! - Registration and email verification
//! - Login, token refresh and logout
//! - Current user and agent profile update
//! - Password reset

pub mod cookie;
pub mod login;
pub mod logout;
pub mod password;
pub mod profile;
pub mod refresh;
pub mod register;
pub mod verify;

use actix_web::HttpResponse;

use sigma_core::errors::DomainError;
use sigma_core::LoginResult;

use crate::dto::LoginResponse;
use crate::handlers::handle_domain_error;
use cookie::RefreshCookie;

/// `{access_token, user}` with the refresh token set as a cookie
pub(crate) fn login_response(cookie: &RefreshCookie, result: LoginResult) -> HttpResponse {
    HttpResponse::Ok()
        .cookie(cookie.build(result.refresh_token))
        .json(LoginResponse {
            access_token: result.access_token,
            user: result.user.into(),
        })
}

/// Error response of the refresh token endpoints
///
/// Token failures also drop the cookie so the client stops sending it.
pub(crate) fn refresh_failure(cookie: &RefreshCookie, error: DomainError) -> HttpResponse {
    let clear = matches!(error, DomainError::Token(_));
    let mut response = handle_domain_error(error);
    if clear {
        if let Err(e) = response.add_cookie(&cookie.removal()) {
            tracing::warn!(error = %e, "Failed to clear the refresh cookie");
        }
    }
    response
}
