use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::Value;

use sigma_core::validation::parse_email;
use sigma_core::{
    MailServiceTrait, PostRepository, SessionRepository, UserRepository, VerificationOutcome,
};
use sigma_shared::SuccessResponse;

use crate::handlers::handle_domain_error;
use crate::i18n::{verification_page, Language};
use crate::routes::AppState;

/// Handler for GET /api/auth/verify/{token}
///
/// Opened from the emailed link. Always answers 200 with a localized
/// `{status, message}` payload; storage failures are reported as a failed
/// verification.
pub async fn verify_email<U, S, P, M>(
    state: web::Data<AppState<U, S, P, M>>,
    token: web::Path<String>,
    req: HttpRequest,
) -> HttpResponse
where
    U: UserRepository + 'static,
    S: SessionRepository + 'static,
    P: PostRepository + 'static,
    M: MailServiceTrait + 'static,
{
    let outcome = match state.auth_service.verify_email(&token).await {
        Ok(outcome) => outcome,
        Err(error) => {
            tracing::error!(error = %error, event = "verification_failed", "Verification failed");
            VerificationOutcome::Failed
        }
    };

    HttpResponse::Ok().json(verification_page(outcome, Language::from_request(&req)))
}

/// Handler for POST /api/auth/verify
///
/// Mails a new verification link to `{ "email": ... }`.
///
/// - 404 Unknown email
/// - 409 The account is verified already
pub async fn resend_verification<U, S, P, M>(
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

    match state.auth_service.resend_verification(&email).await {
        Ok(()) => HttpResponse::Ok().json(SuccessResponse::new()),
        Err(error) => handle_domain_error(error),
    }
}
