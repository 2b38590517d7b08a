//! Post route handlers
//!
//! Creating, listing, updating and deleting require an access token; a
//! single post is public.

use actix_web::{web, HttpResponse};
use serde_json::Value;
use uuid::Uuid;

use sigma_core::errors::{DomainError, PostError};
use sigma_core::validation::{parse_new_post, parse_post_changes};
use sigma_core::{MailServiceTrait, PostRepository, SessionRepository, UserRepository};
use sigma_shared::OkResponse;

use crate::dto::{PostEnvelope, PostIdResponse, PostsEnvelope};
use crate::handlers::handle_domain_error;
use crate::middleware::AuthContext;
use crate::routes::AppState;

/// Ids that are not uuids cannot name a stored post
fn parse_post_id(id: &str) -> Result<Uuid, DomainError> {
    Uuid::parse_str(id).map_err(|_| PostError::NotFound.into())
}

/// Handler for POST /api/posts
///
/// # Response
///
/// - 200 `{ "postId": "..." }`
/// - 400 Invalid fields, or an image above 5MB (`details.index`)
/// - 403 Max post length reached (clients 1, agents 35)
pub async fn create_post<U, S, P, M>(
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
    let data = match parse_new_post(&body) {
        Ok(data) => data,
        Err(errors) => return handle_domain_error(errors.into()),
    };

    match state.post_service.create(auth.user_id, data).await {
        Ok(post) => HttpResponse::Ok().json(PostIdResponse { post_id: post.id }),
        Err(error) => handle_domain_error(error),
    }
}

/// Handler for GET /api/posts
///
/// Posts of the signed-in user, newest first.
pub async fn list_posts<U, S, P, M>(
    state: web::Data<AppState<U, S, P, M>>,
    auth: AuthContext,
) -> HttpResponse
where
    U: UserRepository + 'static,
    S: SessionRepository + 'static,
    P: PostRepository + 'static,
    M: MailServiceTrait + 'static,
{
    match state.post_service.list(auth.user_id).await {
        Ok(posts) => HttpResponse::Ok().json(PostsEnvelope::from(posts)),
        Err(error) => handle_domain_error(error),
    }
}

/// Handler for GET /api/posts/{id}
pub async fn get_post<U, S, P, M>(
    state: web::Data<AppState<U, S, P, M>>,
    id: web::Path<String>,
) -> HttpResponse
where
    U: UserRepository + 'static,
    S: SessionRepository + 'static,
    P: PostRepository + 'static,
    M: MailServiceTrait + 'static,
{
    let result = match parse_post_id(&id) {
        Ok(post_id) => state.post_service.get(post_id).await,
        Err(error) => Err(error),
    };

    match result {
        Ok(post) => HttpResponse::Ok().json(PostEnvelope::from(post)),
        Err(error) => handle_domain_error(error),
    }
}

/// Handler for PATCH /api/posts/{id}
///
/// Every field is optional except `type`, which must match the post. Images
/// are edited with `images: { new: [{url, size}], removed: [index] }`.
///
/// - 403 You are not the author of this post
/// - 404 Post not found
pub async fn update_post<U, S, P, M>(
    state: web::Data<AppState<U, S, P, M>>,
    auth: AuthContext,
    id: web::Path<String>,
    body: web::Json<Value>,
) -> HttpResponse
where
    U: UserRepository + 'static,
    S: SessionRepository + 'static,
    P: PostRepository + 'static,
    M: MailServiceTrait + 'static,
{
    let post_id = match parse_post_id(&id) {
        Ok(post_id) => post_id,
        Err(error) => return handle_domain_error(error),
    };
    let changes = match parse_post_changes(&body) {
        Ok(changes) => changes,
        Err(errors) => return handle_domain_error(errors.into()),
    };

    match state.post_service.update(auth.user_id, post_id, changes).await {
        Ok(post) => HttpResponse::Ok().json(PostEnvelope::from(post)),
        Err(error) => handle_domain_error(error),
    }
}

/// Handler for DELETE /api/posts/{id}
pub async fn delete_post<U, S, P, M>(
    state: web::Data<AppState<U, S, P, M>>,
    auth: AuthContext,
    id: web::Path<String>,
) -> HttpResponse
where
    U: UserRepository + 'static,
    S: SessionRepository + 'static,
    P: PostRepository + 'static,
    M: MailServiceTrait + 'static,
{
    let result = match parse_post_id(&id) {
        Ok(post_id) => state.post_service.delete(auth.user_id, post_id).await,
        Err(error) => Err(error),
    };

    match result {
        Ok(()) => HttpResponse::Ok().json(OkResponse::new()),
        Err(error) => handle_domain_error(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_post_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_post_id(&id.to_string()), Ok(id));
        assert_eq!(
            parse_post_id("42"),
            Err(DomainError::Post(PostError::NotFound))
        );
    }
}
