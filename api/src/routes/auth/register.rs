use actix_web::{web, HttpResponse};
use serde_json::Value;

use sigma_core::validation::parse_registration;
use sigma_core::{MailServiceTrait, PostRepository, SessionRepository, UserRepository};
use sigma_shared::SuccessResponse;

use crate::handlers::handle_domain_error;
use crate::routes::AppState;

/// Handler for POST /api/auth/register
///
/// Registers a client or an agent and mails a verification link.
///
/// # Request Body
///
/// ```json
/// {
///     "type": "client",
///     "email": "ana@example.com",
///     "password": "secret1",
///     "repassword": "secret1"
/// }
/// ```
///
/// Agents add `firstname`, `lastname`, `phone`, `avatar {url, size}` and an
/// optional `bio`.
///
/// # Response
///
/// - 200 `{ "success": true }`
/// - 400 Invalid fields or an avatar above 5MB
/// - 409 A verified account owns the email
pub async fn register<U, S, P, M>(
    state: web::Data<AppState<U, S, P, M>>,
    body: web::Json<Value>,
) -> HttpResponse
where
    U: UserRepository + 'static,
    S: SessionRepository + 'static,
    P: PostRepository + 'static,
    M: MailServiceTrait + 'static,
{
    let registration = match parse_registration(&body) {
        Ok(registration) => registration,
        Err(errors) => return handle_domain_error(errors.into()),
    };

    match state.auth_service.register(registration).await {
        Ok(()) => HttpResponse::Ok().json(SuccessResponse::new()),
        Err(error) => handle_domain_error(error),
    }
}
