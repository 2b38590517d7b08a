mod common;

use actix_web::{http::StatusCode, test};
use serde_json::json;

use common::*;
use sigma_api::app::create_app;

const NEW_PASSWORD: &str = "changed9";

fn wrong_code(code: &str) -> &'static str {
    if code == "000000" {
        "111111"
    } else {
        "000000"
    }
}

#[actix_rt::test]
async fn test_password_reset_flow() {
    let ctx = TestContext::new();
    let app = test::init_service(create_app(ctx.state.clone(), &ctx.config)).await;
    signup(&app, &ctx, client_body("ana@example.com")).await;

    let resp = send(
        &app,
        post_json("/api/auth/password", json!({ "email": "ana@example.com" })).to_request(),
    )
    .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body, json!({ "ok": true }));

    let code = ctx.mail.wait_for_code("ana@example.com").await.unwrap();
    assert_eq!(code.len(), 6);

    let req = test::TestRequest::put()
        .uri("/api/auth/password")
        .set_json(json!({ "email": "ana@example.com", "code": code }))
        .to_request();
    let resp = send(&app, req).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body, json!({ "ok": true }));

    // A code works once
    let req = test::TestRequest::put()
        .uri("/api/auth/password")
        .set_json(json!({ "email": "ana@example.com", "code": code }))
        .to_request();
    assert_eq!(send(&app, req).await.status, StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::patch()
        .uri("/api/auth/password")
        .set_json(json!({
            "email": "ana@example.com",
            "password": NEW_PASSWORD,
            "repassword": NEW_PASSWORD
        }))
        .to_request();
    let resp = send(&app, req).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body["access_token"].is_string());
    assert_eq!(resp.body["user"]["type"], "client");
    assert!(!resp.refresh_token().is_empty());

    // Old password is gone, the new one logs in
    assert_eq!(login(&app, "ana@example.com").await.status, StatusCode::UNAUTHORIZED);
    let resp = send(
        &app,
        post_json(
            "/api/auth/login",
            json!({ "email": "ana@example.com", "password": NEW_PASSWORD }),
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status, StatusCode::OK);

    // The pending flag is consumed by the reset
    let req = test::TestRequest::patch()
        .uri("/api/auth/password")
        .set_json(json!({
            "email": "ana@example.com",
            "password": "another1",
            "repassword": "another1"
        }))
        .to_request();
    assert_eq!(send(&app, req).await.status, StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn test_password_code_for_unknown_email_is_silent() {
    let ctx = TestContext::new();
    let app = test::init_service(create_app(ctx.state.clone(), &ctx.config)).await;

    let resp = send(
        &app,
        post_json("/api/auth/password", json!({ "email": "ghost@example.com" })).to_request(),
    )
    .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert!(ctx.mail.sent().is_empty());
}

#[actix_rt::test]
async fn test_wrong_password_code_is_rejected() {
    let ctx = TestContext::new();
    let app = test::init_service(create_app(ctx.state.clone(), &ctx.config)).await;
    signup(&app, &ctx, client_body("ana@example.com")).await;

    send(
        &app,
        post_json("/api/auth/password", json!({ "email": "ana@example.com" })).to_request(),
    )
    .await;
    let code = ctx.mail.wait_for_code("ana@example.com").await.unwrap();

    let req = test::TestRequest::put()
        .uri("/api/auth/password")
        .set_json(json!({ "email": "ana@example.com", "code": wrong_code(&code) }))
        .to_request();
    let resp = send(&app, req).await;

    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.body["message"], "Code validation fails");

    let req = test::TestRequest::put()
        .uri("/api/auth/password")
        .set_json(json!({ "email": "ana@example.com", "code": "12ab" }))
        .to_request();
    assert_eq!(send(&app, req).await.status, StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_reset_without_confirmed_code() {
    let ctx = TestContext::new();
    let app = test::init_service(create_app(ctx.state.clone(), &ctx.config)).await;
    signup(&app, &ctx, client_body("ana@example.com")).await;

    let req = test::TestRequest::patch()
        .uri("/api/auth/password")
        .set_json(json!({
            "email": "ana@example.com",
            "password": NEW_PASSWORD,
            "repassword": NEW_PASSWORD
        }))
        .to_request();
    let resp = send(&app, req).await;

    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.body["message"], "Unable to reset the password");
    assert_eq!(login(&app, "ana@example.com").await.status, StatusCode::OK);
}
