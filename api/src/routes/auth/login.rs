use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::Value;

use sigma_core::validation::parse_login;
use sigma_core::{MailServiceTrait, PostRepository, SessionRepository, UserRepository};

use super::login_response;
use crate::handlers::handle_domain_error;
use crate::routes::{device_info, AppState};

/// Handler for POST /api/auth/login
///
/// # Request Body
///
/// ```json
/// { "email": "ana@example.com", "password": "secret1" }
/// ```
///
/// # Response
///
/// - 200 `{ "access_token": "eyJ...", "user": {...} }` plus the
///   `refresh_token` cookie
/// - 401 Bad credentials (unknown email, unverified account or wrong password)
pub async fn login<U, S, P, M>(
    state: web::Data<AppState<U, S, P, M>>,
    body: web::Json<Value>,
    req: HttpRequest,
) -> HttpResponse
where
    U: UserRepository + 'static,
    S: SessionRepository + 'static,
    P: PostRepository + 'static,
    M: MailServiceTrait + 'static,
{
    let credentials = match parse_login(&body) {
        Ok(credentials) => credentials,
        Err(errors) => return handle_domain_error(errors.into()),
    };

    match state
        .auth_service
        .login(&credentials.email, &credentials.password, device_info(&req))
        .await
    {
        Ok(result) => login_response(&state.refresh_cookie, result),
        Err(error) => handle_domain_error(error),
    }
}
