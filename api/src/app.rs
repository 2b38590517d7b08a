//! Application factory
//!
//! Builds the Actix-web application from the shared state: middleware,
//! the `/api` routes, the health check and the JSON 404.

use std::sync::Arc;

use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    error::InternalError,
    web, App, Error, HttpRequest, HttpResponse,
};
use tracing_actix_web::TracingLogger;

use sigma_core::{MailServiceTrait, PostRepository, SessionRepository, UserRepository};
use sigma_infra::DatabasePool;
use sigma_shared::{AppConfig, HealthResponse};

use crate::handlers::error::{invalid_query, json_error_handler, not_found};
use crate::middleware::{create_cors, JwtAuth, SecurityMiddleware};
use crate::routes::{auth, posts, search, AppState};

/// Create and configure the application with all dependencies
pub fn create_app<U, S, P, M>(
    app_state: web::Data<AppState<U, S, P, M>>,
    config: &AppConfig,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = Error,
        InitError = (),
    >,
>
where
    U: UserRepository + 'static,
    S: SessionRepository + 'static,
    P: PostRepository + 'static,
    M: MailServiceTrait + 'static,
{
    let token_service = web::Data::from(Arc::clone(&app_state.token_service));

    App::new()
        .app_data(app_state)
        .app_data(token_service)
        .app_data(
            web::JsonConfig::default()
                .limit(config.server.max_payload_size)
                .error_handler(json_error_handler),
        )
        .app_data(web::QueryConfig::default().error_handler(|err, _req| {
            InternalError::from_response(err, invalid_query()).into()
        }))
        // Middleware order matters: the last one wraps everything else
        .wrap(SecurityMiddleware::new(config.environment))
        .wrap(create_cors(&config.cors))
        .wrap(TracingLogger::default())
        .route("/health", web::get().to(health_check))
        .service(
            web::scope("/api")
                .service(
                    web::scope("/auth")
                        .route("/register", web::post().to(auth::register::register::<U, S, P, M>))
                        .route(
                            "/verify/{token}",
                            web::get().to(auth::verify::verify_email::<U, S, P, M>),
                        )
                        .route(
                            "/verify",
                            web::post().to(auth::verify::resend_verification::<U, S, P, M>),
                        )
                        .route("/login", web::post().to(auth::login::login::<U, S, P, M>))
                        .route("/refresh", web::post().to(auth::refresh::refresh::<U, S, P, M>))
                        .route("/logout", web::post().to(auth::logout::logout::<U, S, P, M>))
                        .route(
                            "",
                            web::get()
                                .to(auth::profile::current_user::<U, S, P, M>)
                                .wrap(JwtAuth::new()),
                        )
                        .route(
                            "",
                            web::patch()
                                .to(auth::profile::update_profile::<U, S, P, M>)
                                .wrap(JwtAuth::new()),
                        )
                        .route(
                            "/password",
                            web::post().to(auth::password::request_code::<U, S, P, M>),
                        )
                        .route(
                            "/password",
                            web::put().to(auth::password::confirm_code::<U, S, P, M>),
                        )
                        .route(
                            "/password",
                            web::patch().to(auth::password::reset_password::<U, S, P, M>),
                        ),
                )
                .service(
                    web::scope("/posts")
                        .route(
                            "",
                            web::post()
                                .to(posts::create_post::<U, S, P, M>)
                                .wrap(JwtAuth::new()),
                        )
                        .route(
                            "",
                            web::get()
                                .to(posts::list_posts::<U, S, P, M>)
                                .wrap(JwtAuth::new()),
                        )
                        .route("/{id}", web::get().to(posts::get_post::<U, S, P, M>))
                        .route(
                            "/{id}",
                            web::patch()
                                .to(posts::update_post::<U, S, P, M>)
                                .wrap(JwtAuth::new()),
                        )
                        .route(
                            "/{id}",
                            web::delete()
                                .to(posts::delete_post::<U, S, P, M>)
                                .wrap(JwtAuth::new()),
                        ),
                )
                .route("/search", web::get().to(search::search::<U, S, P, M>)),
        )
        .default_service(web::route().to(not_found))
}

/// Health check endpoint handler
///
/// Reports `degraded` when a registered database pool does not answer.
async fn health_check(req: HttpRequest) -> HttpResponse {
    let version = env!("CARGO_PKG_VERSION");

    let Some(pool) = req.app_data::<web::Data<DatabasePool>>() else {
        return HttpResponse::Ok().json(HealthResponse::healthy(version));
    };

    match pool.health_check().await {
        Ok(true) => HttpResponse::Ok().json(HealthResponse::healthy(version)),
        _ => HttpResponse::ServiceUnavailable().json(HealthResponse::degraded(version)),
    }
}
