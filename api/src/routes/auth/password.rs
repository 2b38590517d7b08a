//! Password reset in three steps: request a mailed code, confirm it, then
//! set the new password.

use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::Value;

use sigma_core::validation::{parse_email, parse_password_code, parse_password_reset};
use sigma_core::{MailServiceTrait, PostRepository, SessionRepository, UserRepository};
use sigma_shared::OkResponse;

use super::login_response;
use crate::handlers::handle_domain_error;
use crate::routes::{device_info, AppState};

/// Handler for POST /api/auth/password
///
/// Mails a 6 digit code to `{ "email": ... }`. Unknown emails get the same
/// `{ "ok": true }` answer.
pub async fn request_code<U, S, P, M>(
    state: web::Data<AppState<U, S, P, M>>,
    body: web::Json<Value>,
) -> HttpResponse
where
    U: UserRepository + 'static,
    S: SessionRepository + 'static,
    P: PostRepository + 'static,
    M: MailServiceTrait + 'static,
{
    let email = match parse_email(&body) {
        Ok(email) => email,
        Err(errors) => return handle_domain_error(errors.into()),
    };

    match state.auth_service.request_password_reset(&email).await {
        Ok(()) => HttpResponse::Ok().json(OkResponse::new()),
        Err(error) => handle_domain_error(error),
    }
}

/// Handler for PUT /api/auth/password
///
/// Checks `{ "email": ..., "code": "123456" }` and opens a short window for
/// the new password.
///
/// - 401 Code validation fails
pub async fn confirm_code<U, S, P, M>(
    state: web::Data<AppState<U, S, P, M>>,
    body: web::Json<Value>,
) -> HttpResponse
where
    U: UserRepository + 'static,
    S: SessionRepository + 'static,
    P: PostRepository + 'static,
    M: MailServiceTrait + 'static,
{
    let check = match parse_password_code(&body) {
        Ok(check) => check,
        Err(errors) => return handle_domain_error(errors.into()),
    };

    match state
        .auth_service
        .confirm_password_code(&check.email, &check.code)
        .await
    {
        Ok(()) => HttpResponse::Ok().json(OkResponse::new()),
        Err(error) => handle_domain_error(error),
    }
}

/// Handler for PATCH /api/auth/password
///
/// Stores `{ "email", "password", "repassword" }` after a confirmed code and
/// logs the user in, exactly like `/api/auth/login`.
///
/// - 401 Unable to reset the password
pub async fn reset_password<U, S, P, M>(
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
    let reset = match parse_password_reset(&body) {
        Ok(reset) => reset,
        Err(errors) => return handle_domain_error(errors.into()),
    };

    match state
        .auth_service
        .reset_password(reset, device_info(&req))
        .await
    {
        Ok(result) => login_response(&state.refresh_cookie, result),
        Err(error) => handle_domain_error(error),
    }
}
