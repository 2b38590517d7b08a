use std::sync::Arc;

use actix_web::{web, HttpServer};
use anyhow::Context;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sigma_api::app::create_app;
use sigma_api::routes::{auth::cookie::RefreshCookie, AppState};
use sigma_core::{AuthService, AuthServiceConfig, PostService, TokenService, TokenServiceConfig};
use sigma_infra::{
    create_mail_service, DatabasePool, MySqlPostRepository, MySqlSessionRepository,
    MySqlUserRepository,
};
use sigma_shared::config::LogFormat;
use sigma_shared::{AppConfig, LoggingConfig};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();
    init_tracing(&config.logging);

    config
        .validate()
        .map_err(anyhow::Error::msg)
        .context("Invalid configuration")?;
    if config.auth.jwt.is_using_default_secrets() {
        tracing::warn!("Using development JWT secrets");
    }

    tracing::info!(
        environment = %config.environment,
        version = env!("CARGO_PKG_VERSION"),
        "Starting Sigma API server"
    );

    let pool = DatabasePool::new(config.database.clone())
        .await
        .context("Failed to connect to the database")?;
    if config.database.run_migrations {
        pool.run_migrations()
            .await
            .context("Failed to apply database migrations")?;
    }

    let users = Arc::new(MySqlUserRepository::new(pool.get_pool().clone()));
    let sessions = Arc::new(MySqlSessionRepository::new(pool.get_pool().clone()));
    let posts = Arc::new(MySqlPostRepository::new(pool.get_pool().clone()));

    let mail = Arc::new(create_mail_service(&config.mail));
    tracing::info!(provider = mail.provider_name(), "Mail service ready");

    let token_service = Arc::new(TokenService::new(TokenServiceConfig::from(
        &config.auth.jwt,
    )));
    let auth_service = Arc::new(AuthService::new(
        Arc::clone(&users),
        sessions,
        mail,
        Arc::clone(&token_service),
        AuthServiceConfig::new(&config.auth, &config.mail),
    ));
    let post_service = Arc::new(PostService::new(posts, users));

    let app_state = web::Data::new(AppState {
        auth_service,
        post_service,
        refresh_cookie: RefreshCookie::new(
            config.auth.cookie.clone(),
            token_service.refresh_token_ttl(),
        ),
        token_service,
    });
    let pool_data = web::Data::new(pool.clone());

    let bind_address = config.server.bind_address();
    tracing::info!(address = %bind_address, "Server will bind");

    let app_config = config.clone();
    let mut server = HttpServer::new(move || {
        create_app(app_state.clone(), &app_config).app_data(pool_data.clone())
    });
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server
        .bind(&bind_address)
        .with_context(|| format!("Failed to bind {}", bind_address))?
        .run()
        .await?;

    pool.close().await;
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.clone()));

    let registry = tracing_subscriber::registry().with(filter);
    match logging.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(true))
            .init(),
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .pretty()
                    .with_file(logging.source_location)
                    .with_line_number(logging.source_location),
            )
            .init(),
        LogFormat::Compact => registry.with(fmt::layer().compact()).init(),
    }
}
