use actix_web::{web, HttpRequest, HttpResponse};

use sigma_core::errors::TokenError;
use sigma_core::{MailServiceTrait, PostRepository, SessionRepository, TokenKind, UserRepository};
use sigma_shared::OkResponse;

use super::refresh_failure;
use crate::routes::AppState;

/// Handler for POST /api/auth/logout
///
/// Deletes the session behind the `refresh_token` cookie and clears the
/// cookie. Errors are the same as for `/api/auth/refresh`.
pub async fn logout<U, S, P, M>(
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

    match state.auth_service.logout(&token).await {
        Ok(()) => HttpResponse::Ok()
            .cookie(cookie.removal())
            .json(OkResponse::new()),
        Err(error) => refresh_failure(cookie, error),
    }
}
