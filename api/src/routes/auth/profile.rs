use actix_web::{web, HttpResponse};
use serde_json::Value;

use sigma_core::validation::parse_agent_update;
use sigma_core::{MailServiceTrait, PostRepository, SessionRepository, UserRepository};

use crate::dto::UserEnvelope;
use crate::handlers::handle_domain_error;
use crate::middleware::AuthContext;
use crate::routes::AppState;

/// Handler for GET /api/auth
///
/// The signed-in user, `{ "user": {...} }`.
pub async fn current_user<U, S, P, M>(
    state: web::Data<AppState<U, S, P, M>>,
    auth: AuthContext,
) -> HttpResponse
where
    U: UserRepository + 'static,
    S: SessionRepository + 'static,
    P: PostRepository + 'static,
    M: MailServiceTrait + 'static,
{
    match state.auth_service.current_user(auth.user_id).await {
        Ok(user) => HttpResponse::Ok().json(UserEnvelope::from(user)),
        Err(error) => handle_domain_error(error),
    }
}

/// Handler for PATCH /api/auth
///
/// Updates the profile of the signed-in agent. `phone` is required;
/// `firstname`, `lastname`, `bio` and `avatar` are optional.
///
/// - 403 The user is not an agent, checked before the body
pub async fn update_profile<U, S, P, M>(
    state: web::Data<AppState<U, S, P, M>>,
    auth: AuthContext,
    body: web::Json<Value>,
) -> HttpResponse
where
    U: UserRepository + 'static,
    S: SessionRepository + 'static,
    P: PostRepository + 'static,
    M: MailServiceTrait + 'static,
{
    if let Err(error) = state.auth_service.require_agent(auth.user_id).await {
        return handle_domain_error(error);
    }
    let update = match parse_agent_update(&body) {
        Ok(update) => update,
        Err(errors) => return handle_domain_error(errors.into()),
    };

    match state.auth_service.update_profile(auth.user_id, update).await {
        Ok(user) => HttpResponse::Ok().json(UserEnvelope::from(user)),
        Err(error) => handle_domain_error(error),
    }
}
