use actix_web::{web, HttpRequest, HttpResponse};

use sigma_core::errors::TokenError;
use sigma_core::{MailServiceTrait, PostRepository, SessionRepository, TokenKind, UserRepository};

use super::refresh_failure;
use crate::dto::AccessTokenResponse;
use crate::routes::AppState;

/// Handler for POST /api/auth/refresh
///
/// Rotates the session behind the `refresh_token` cookie and issues a new
/// access token. Every previously issued refresh token of the session stops
/// working.
///
/// # Response
///
/// - 200 `{ "access_token": "eyJ..." }` plus a new `refresh_token` cookie
/// - 400 Invalid or missing refresh token (cookie cleared)
/// - 401 The refresh token has expired (cookie cleared)
pub async fn refresh<U, S, P, M>(
    state: web::Data<AppState<U, S, P, M>>,
    req: HttpRequest,
) -> HttpResponse
where
    U: UserRepository + 'static,
    S: SessionRepository + 'static,
    P: PostRepository + 'static,
    M: MailServiceTrait + 'static,
{
    let cookie = &state.refresh_cookie;
    let Some(token) = cookie.read(&req) else {
        return refresh_failure(cookie, TokenError::Missing(TokenKind::Refresh).into());
    };

    match state.auth_service.refresh(&token).await {
        Ok(result) => HttpResponse::Ok()
            .cookie(cookie.build(result.refresh_token))
            .json(AccessTokenResponse {
                access_token: result.access_token,
            }),
        Err(error) => refresh_failure(cookie, error),
    }
}
