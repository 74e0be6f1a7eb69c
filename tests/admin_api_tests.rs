
use reqwest::{header, StatusCode};
use serde_json::{json, Value};
use test_utils::*;

#[actix_rt::test]
async fn correct_password_logs_in() {
    let app = TestApp::spawn().await;

    let response = app.login(&json!({ "password": ADMIN_PASSWORD })).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "success": true }));
}

#[actix_rt::test]
async fn wrong_password_is_unauthorized() {
    let app = TestApp::spawn().await;

    let response = app.login(&json!({ "password": "guess" })).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "unauthorized");
}

#[actix_rt::test]
async fn missing_or_blank_password_is_a_bad_request() {
    let app = TestApp::spawn().await;

    for body in [json!({}), json!({ "password": "   " }), json!({ "password": null })] {
        let response = app.login(&body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
    }
}

#[actix_rt::test]
async fn unconfigured_password_is_a_server_error() {
    let app = TestApp::spawn_with(|config| config.admin_password = None).await;

    let response = app.login(&json!({ "password": "anything" })).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "internal_error");
}

#[actix_rt::test]
async fn attempts_are_throttled_per_client() {
    let app = TestApp::spawn_with(|config| config.login_attempts_per_minute = 2).await;

    for _ in 0..2 {
        let response = app.login(&json!({ "password": "guess" })).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    // even the right password waits once the budget is spent
    let response = app.login(&json!({ "password": ADMIN_PASSWORD })).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let retry_after: u64 = response.headers()[header::RETRY_AFTER]
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!(retry_after >= 1);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "rate_limited");
}
