//! Shared setup for the api integration tests: the application state over
//! the in-memory repositories and helpers for the common request sequences.

#![allow(dead_code)]

use std::sync::Arc;

use actix_web::{
    body::MessageBody,
    cookie::Cookie,
    dev::{Service, ServiceResponse},
    http::{header, StatusCode},
    test, web,
};
use serde_json::{json, Value};

use sigma_api::routes::{auth::cookie::RefreshCookie, AppState};
use sigma_core::repositories::{MockPostRepository, MockSessionRepository, MockUserRepository};
use sigma_core::services::MockMailService;
use sigma_core::{AuthService, AuthServiceConfig, PostService, TokenService, TokenServiceConfig};
use sigma_shared::{AppConfig, CookieConfig};

pub type TestState =
    AppState<MockUserRepository, MockSessionRepository, MockPostRepository, MockMailService>;

pub const PASSWORD: &str = "secret1";

pub struct TestContext {
    pub state: web::Data<TestState>,
    pub users: Arc<MockUserRepository>,
    pub sessions: Arc<MockSessionRepository>,
    pub posts: Arc<MockPostRepository>,
    pub mail: Arc<MockMailService>,
    pub tokens: Arc<TokenService>,
    pub config: AppConfig,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_tokens(TokenServiceConfig::default())
    }

    pub fn with_tokens(token_config: TokenServiceConfig) -> Self {
        let users = Arc::new(MockUserRepository::new());
        let sessions = Arc::new(MockSessionRepository::new());
        let posts = Arc::new(MockPostRepository::new());
        let mail = Arc::new(MockMailService::new());
        let tokens = Arc::new(TokenService::new(token_config));

        let auth_service = Arc::new(AuthService::new(
            Arc::clone(&users),
            Arc::clone(&sessions),
            Arc::clone(&mail),
            Arc::clone(&tokens),
            AuthServiceConfig {
                bcrypt_cost: 4,
                ..AuthServiceConfig::default()
            },
        ));
        let post_service = Arc::new(PostService::new(Arc::clone(&posts), Arc::clone(&users)));

        let state = web::Data::new(AppState {
            auth_service,
            post_service,
            token_service: Arc::clone(&tokens),
            refresh_cookie: RefreshCookie::new(CookieConfig::default(), tokens.refresh_token_ttl()),
        });

        Self {
            state,
            users,
            sessions,
            posts,
            mail,
            tokens,
            config: AppConfig::default(),
        }
    }
}

/// Status, JSON body and cookies of a response
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub cookies: Vec<Cookie<'static>>,
}

impl TestResponse {
    pub fn cookie(&self, name: &str) -> Option<&Cookie<'static>> {
        self.cookies.iter().find(|cookie| cookie.name() == name)
    }

    pub fn refresh_token(&self) -> String {
        self.cookie("refresh_token")
            .expect("refresh_token cookie")
            .value()
            .to_string()
    }
}

pub async fn send<S, R, B>(app: &S, req: R) -> TestResponse
where
    S: Service<R, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let cookies = resp
        .response()
        .cookies()
        .map(|cookie| cookie.into_owned())
        .collect();
    let bytes = test::read_body(resp).await;
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    TestResponse {
        status,
        body,
        cookies,
    }
}

pub fn post_json(uri: &str, body: Value) -> test::TestRequest {
    test::TestRequest::post().uri(uri).set_json(body)
}

pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}

pub fn client_body(email: &str) -> Value {
    json!({
        "type": "client",
        "email": email,
        "password": PASSWORD,
        "repassword": PASSWORD
    })
}

pub fn agent_body(email: &str) -> Value {
    json!({
        "type": "agent",
        "email": email,
        "password": PASSWORD,
        "repassword": PASSWORD,
        "firstname": "José",
        "lastname": "Martí",
        "phone": "+1 650 253 0000",
        "avatar": { "url": "/uploads/avatar.png", "size": 2048 }
    })
}

pub fn property() -> Value {
    json!({
        "address": { "province": "La Habana", "municipality": "Playa" },
        "features": {
            "bed": 2, "bath": 1,
            "backyard": false, "balcony": true, "garage": false, "pool": false
        }
    })
}

pub fn sale_body(amount: u32) -> Value {
    json!({
        "type": "sale",
        "description": "Casa con vista al mar",
        "whatsapp": true,
        "phone": "+1 650 253 0000",
        "amount": amount,
        "currency": "USD",
        "properties": [property()],
        "images": [{ "url": "/uploads/1.png", "size": 1000 }]
    })
}

/// Token at the end of the `nth` (1-based) verification link mailed to
/// `email`, waiting for the background delivery
pub async fn verification_token(ctx: &TestContext, email: &str, nth: usize) -> String {
    let links = ctx.mail.wait_for_links(email, nth).await;
    let link = links.get(nth - 1).expect("verification link");
    link.rsplit('/').next().unwrap_or_default().to_string()
}

/// Registers `body`, follows the mailed link and logs in.
/// Returns the login response.
pub async fn signup<S, B>(app: &S, ctx: &TestContext, body: Value) -> TestResponse
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let email = body["email"].as_str().unwrap_or_default().to_string();

    let resp = send(app, post_json("/api/auth/register", body).to_request()).await;
    assert_eq!(resp.status, StatusCode::OK, "{}", resp.body);

    let token = verification_token(ctx, &email, 1).await;
    let req = test::TestRequest::get()
        .uri(&format!("/api/auth/verify/{}", token))
        .to_request();
    let resp = send(app, req).await;
    assert_eq!(resp.body["status"], "verified");

    login(app, &email).await
}

pub async fn login<S, B>(app: &S, email: &str) -> TestResponse
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = post_json("/api/auth/login", json!({ "email": email, "password": PASSWORD }))
        .insert_header((header::USER_AGENT, "Mozilla/5.0 (X11; Linux x86_64) Firefox/125.0"))
        .to_request();
    send(app, req).await
}

/// Access token of a freshly signed up client
pub async fn client_token<S, B>(app: &S, ctx: &TestContext, email: &str) -> String
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let resp = signup(app, ctx, client_body(email)).await;
    assert_eq!(resp.status, StatusCode::OK, "{}", resp.body);
    resp.body["access_token"].as_str().unwrap_or_default().to_string()
}
