mod common;

use actix_web::{cookie::Cookie, http::header, http::StatusCode, test};
use serde_json::json;

use common::*;
use sigma_api::app::create_app;
use sigma_core::TokenServiceConfig;

#[actix_rt::test]
async fn test_register_client_mails_verification_link() {
    let ctx = TestContext::new();
    let app = test::init_service(create_app(ctx.state.clone(), &ctx.config)).await;

    let resp = send(
        &app,
        post_json("/api/auth/register", client_body("ana@example.com")).to_request(),
    )
    .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body, json!({ "success": true }));
    assert_eq!(ctx.users.user_count().await, 1);

    let link = ctx.mail.wait_for_link("ana@example.com").await.unwrap();
    assert!(link.contains("/api/auth/verify/"));
}

#[actix_rt::test]
async fn test_register_rejects_invalid_body() {
    let ctx = TestContext::new();
    let app = test::init_service(create_app(ctx.state.clone(), &ctx.config)).await;

    let body = json!({
        "type": "client",
        "email": "not-an-email",
        "password": PASSWORD,
        "repassword": "different"
    });
    let resp = send(&app, post_json("/api/auth/register", body).to_request()).await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["error"], "VALIDATION_ERROR");
    assert_eq!(resp.body["message"], "Invalid or missing required parameters");

    let fields: Vec<&str> = resp.body["details"]["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"email"));
    assert_eq!(ctx.users.user_count().await, 0);
}

#[actix_rt::test]
async fn test_register_verified_email_conflicts() {
    let ctx = TestContext::new();
    let app = test::init_service(create_app(ctx.state.clone(), &ctx.config)).await;

    signup(&app, &ctx, client_body("ana@example.com")).await;
    let resp = send(
        &app,
        post_json("/api/auth/register", client_body("ana@example.com")).to_request(),
    )
    .await;

    assert_eq!(resp.status, StatusCode::CONFLICT);
    assert_eq!(resp.body["error"], "CONFLICT");
}

#[actix_rt::test]
async fn test_register_agent_with_large_avatar() {
    let ctx = TestContext::new();
    let app = test::init_service(create_app(ctx.state.clone(), &ctx.config)).await;

    let mut body = agent_body("agent@example.com");
    body["avatar"]["size"] = json!(6 * 1024 * 1024);
    let resp = send(&app, post_json("/api/auth/register", body).to_request()).await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["error"], "MAX_FILE_SIZE");
    assert_eq!(resp.body["message"], "File exceeds the maximum allowed size");
}

#[actix_rt::test]
async fn test_verification_page_is_localized() {
    let ctx = TestContext::new();
    let app = test::init_service(create_app(ctx.state.clone(), &ctx.config)).await;

    send(
        &app,
        post_json("/api/auth/register", client_body("ana@example.com")).to_request(),
    )
    .await;
    let token = verification_token(&ctx, "ana@example.com", 1).await;

    let req = test::TestRequest::get()
        .uri(&format!("/api/auth/verify/{}", token))
        .to_request();
    let spanish = send(&app, req).await;
    assert_eq!(spanish.status, StatusCode::OK);
    assert_eq!(spanish.body["status"], "verified");

    let req = test::TestRequest::get()
        .uri(&format!("/api/auth/verify/{}", token))
        .insert_header((header::ACCEPT_LANGUAGE, "en-US,en;q=0.9"))
        .to_request();
    let english = send(&app, req).await;
    assert_eq!(english.status, StatusCode::OK);
    assert_eq!(english.body["status"], "already_verified");
    assert_eq!(english.body["message"], "This account is verified already.");
    assert_ne!(spanish.body["message"], english.body["message"]);
}

#[actix_rt::test]
async fn test_verification_with_garbage_token_fails_softly() {
    let ctx = TestContext::new();
    let app = test::init_service(create_app(ctx.state.clone(), &ctx.config)).await;

    let req = test::TestRequest::get()
        .uri("/api/auth/verify/not.a.token")
        .to_request();
    let resp = send(&app, req).await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["status"], "failed");
}

#[actix_rt::test]
async fn test_resend_verification() {
    let ctx = TestContext::new();
    let app = test::init_service(create_app(ctx.state.clone(), &ctx.config)).await;

    let unknown = send(
        &app,
        post_json("/api/auth/verify", json!({ "email": "ghost@example.com" })).to_request(),
    )
    .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);

    send(
        &app,
        post_json("/api/auth/register", client_body("ana@example.com")).to_request(),
    )
    .await;
    let first = verification_token(&ctx, "ana@example.com", 1).await;

    let resp = send(
        &app,
        post_json("/api/auth/verify", json!({ "email": "ana@example.com" })).to_request(),
    )
    .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body, json!({ "success": true }));

    // The first link no longer matches the stored code
    let req = test::TestRequest::get()
        .uri(&format!("/api/auth/verify/{}", first))
        .to_request();
    assert_eq!(send(&app, req).await.body["status"], "failed");

    let second = verification_token(&ctx, "ana@example.com", 2).await;
    let req = test::TestRequest::get()
        .uri(&format!("/api/auth/verify/{}", second))
        .to_request();
    assert_eq!(send(&app, req).await.body["status"], "verified");

    let verified = send(
        &app,
        post_json("/api/auth/verify", json!({ "email": "ana@example.com" })).to_request(),
    )
    .await;
    assert_eq!(verified.status, StatusCode::CONFLICT);
}

#[actix_rt::test]
async fn test_login_requires_verified_account_and_password() {
    let ctx = TestContext::new();
    let app = test::init_service(create_app(ctx.state.clone(), &ctx.config)).await;

    send(
        &app,
        post_json("/api/auth/register", client_body("ana@example.com")).to_request(),
    )
    .await;

    let unverified = login(&app, "ana@example.com").await;
    assert_eq!(unverified.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unverified.body["error"], "BAD_CREDENTIALS");

    let token = verification_token(&ctx, "ana@example.com", 1).await;
    let req = test::TestRequest::get()
        .uri(&format!("/api/auth/verify/{}", token))
        .to_request();
    send(&app, req).await;

    let wrong = send(
        &app,
        post_json(
            "/api/auth/login",
            json!({ "email": "ana@example.com", "password": "wrong-password" }),
        )
        .to_request(),
    )
    .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.body["error"], "BAD_CREDENTIALS");
    assert!(wrong.cookie("refresh_token").is_none());
}

#[actix_rt::test]
async fn test_login_sets_refresh_cookie() {
    let ctx = TestContext::new();
    let app = test::init_service(create_app(ctx.state.clone(), &ctx.config)).await;

    let resp = signup(&app, &ctx, agent_body("agent@example.com")).await;

    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body["access_token"].is_string());
    assert_eq!(resp.body["user"]["type"], "agent");
    assert_eq!(resp.body["user"]["firstname"], "José");
    assert_eq!(resp.body["user"]["phone"], "+16502530000");
    assert!(resp.body["user"].get("password").is_none());

    let cookie = resp.cookie("refresh_token").unwrap();
    assert!(!cookie.value().is_empty());
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.path(), Some("/"));
    assert_eq!(ctx.sessions.session_count().await, 1);
}

#[actix_rt::test]
async fn test_current_user() {
    let ctx = TestContext::new();
    let app = test::init_service(create_app(ctx.state.clone(), &ctx.config)).await;

    let token = client_token(&app, &ctx, "ana@example.com").await;
    let req = test::TestRequest::get()
        .uri("/api/auth")
        .insert_header(bearer(&token))
        .to_request();
    let resp = send(&app, req).await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["user"]["type"], "client");
    assert!(resp.body["user"]["id"].is_string());
    assert!(resp.body["user"].get("firstname").is_none());
}

#[actix_rt::test]
async fn test_refresh_rotates_session_code() {
    let ctx = TestContext::new();
    let app = test::init_service(create_app(ctx.state.clone(), &ctx.config)).await;

    let login = signup(&app, &ctx, client_body("ana@example.com")).await;
    let original = login.refresh_token();

    let req = test::TestRequest::post()
        .uri("/api/auth/refresh")
        .cookie(Cookie::new("refresh_token", original.clone()))
        .to_request();
    let refreshed = send(&app, req).await;
    assert_eq!(refreshed.status, StatusCode::OK);
    assert!(refreshed.body["access_token"].is_string());
    let rotated = refreshed.refresh_token();
    assert_ne!(rotated, original);

    // The previous refresh token is spent
    let req = test::TestRequest::post()
        .uri("/api/auth/refresh")
        .cookie(Cookie::new("refresh_token", original))
        .to_request();
    let replayed = send(&app, req).await;
    assert_eq!(replayed.status, StatusCode::BAD_REQUEST);
    assert_eq!(replayed.body["message"], "Invalid or missing refresh token");
    assert_eq!(replayed.refresh_token(), "");

    let req = test::TestRequest::post()
        .uri("/api/auth/refresh")
        .cookie(Cookie::new("refresh_token", rotated))
        .to_request();
    assert_eq!(send(&app, req).await.status, StatusCode::OK);
}

#[actix_rt::test]
async fn test_refresh_without_cookie() {
    let ctx = TestContext::new();
    let app = test::init_service(create_app(ctx.state.clone(), &ctx.config)).await;

    let req = test::TestRequest::post().uri("/api/auth/refresh").to_request();
    let resp = send(&app, req).await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["error"], "TOKEN_INVALID");
}

#[actix_rt::test]
async fn test_expired_refresh_token_clears_cookie() {
    let ctx = TestContext::with_tokens(TokenServiceConfig {
        refresh_token_expiry: -60,
        ..TokenServiceConfig::default()
    });
    let app = test::init_service(create_app(ctx.state.clone(), &ctx.config)).await;

    let login = signup(&app, &ctx, client_body("ana@example.com")).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/refresh")
        .cookie(Cookie::new("refresh_token", login.refresh_token()))
        .to_request();
    let resp = send(&app, req).await;

    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.body["error"], "TOKEN_EXPIRED");
    assert_eq!(resp.refresh_token(), "");
}

#[actix_rt::test]
async fn test_logout_closes_session() {
    let ctx = TestContext::new();
    let app = test::init_service(create_app(ctx.state.clone(), &ctx.config)).await;

    let login = signup(&app, &ctx, client_body("ana@example.com")).await;
    let refresh_token = login.refresh_token();

    let req = test::TestRequest::post()
        .uri("/api/auth/logout")
        .cookie(Cookie::new("refresh_token", refresh_token.clone()))
        .to_request();
    let resp = send(&app, req).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body, json!({ "ok": true }));
    assert_eq!(resp.refresh_token(), "");
    assert_eq!(ctx.sessions.session_count().await, 0);

    let req = test::TestRequest::post()
        .uri("/api/auth/refresh")
        .cookie(Cookie::new("refresh_token", refresh_token))
        .to_request();
    assert_eq!(send(&app, req).await.status, StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_agent_updates_profile() {
    let ctx = TestContext::new();
    let app = test::init_service(create_app(ctx.state.clone(), &ctx.config)).await;

    let login = signup(&app, &ctx, agent_body("agent@example.com")).await;
    let token = login.body["access_token"].as_str().unwrap().to_string();

    let req = test::TestRequest::patch()
        .uri("/api/auth")
        .insert_header(bearer(&token))
        .set_json(json!({
            "bio": "Ventas en Playa y Miramar",
            "lastname": "Pérez",
            "phone": "+1 650 253 0000"
        }))
        .to_request();
    let resp = send(&app, req).await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["user"]["bio"], "Ventas en Playa y Miramar");
    assert_eq!(resp.body["user"]["lastname"], "Pérez");
    assert_eq!(resp.body["user"]["firstname"], "José");
}

#[actix_rt::test]
async fn test_client_cannot_update_profile() {
    let ctx = TestContext::new();
    let app = test::init_service(create_app(ctx.state.clone(), &ctx.config)).await;

    let token = client_token(&app, &ctx, "ana@example.com").await;
    let req = test::TestRequest::patch()
        .uri("/api/auth")
        .insert_header(bearer(&token))
        .set_json(json!({ "bio": "Hola", "phone": "+1 650 253 0000" }))
        .to_request();
    let resp = send(&app, req).await;

    assert_eq!(resp.status, StatusCode::FORBIDDEN);
    assert_eq!(resp.body["error"], "FORBIDDEN");
}

#[actix_rt::test]
async fn test_client_profile_update_is_forbidden_before_validation() {
    let ctx = TestContext::new();
    let app = test::init_service(create_app(ctx.state.clone(), &ctx.config)).await;

    let token = client_token(&app, &ctx, "ana@example.com").await;
    let req = test::TestRequest::patch()
        .uri("/api/auth")
        .insert_header(bearer(&token))
        .set_json(json!({ "bio": "Hola" }))
        .to_request();
    let resp = send(&app, req).await;

    assert_eq!(resp.status, StatusCode::FORBIDDEN);
    assert_eq!(resp.body["message"], "User is not an agent");
}
