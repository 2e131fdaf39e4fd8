//! HTTP flows through the router.

use axum::http::StatusCode;
use serde_json::json;

use crate::helpers::{NEW_PASSWORD, PASSWORD, TestApp, TestOptions};

async fn register(app: &TestApp, email: &str) -> crate::helpers::TestResponse {
    app.request(
        "POST",
        "/api/auth/register",
        Some(json!({
            "email": email,
            "password": PASSWORD,
            "full_name": "Api User",
        })),
        None,
    )
    .await
}

#[tokio::test]
async fn test_register_me_and_sessions() {
    let app = TestApp::new().await;
    let response = register(&app, "api@example.com").await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["data"]["token_type"], "Bearer");
    assert_eq!(response.body["data"]["user"]["roles"], json!(["user"]));

    let access = response.data_str("access_token");
    let me = app.request("GET", "/api/auth/me", None, Some(&access)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["data"]["email"], "api@example.com");
    assert_eq!(me.body["data"]["permissions"], json!(["sessions:read"]));

    let sessions = app
        .request("GET", "/api/auth/sessions", None, Some(&access))
        .await;
    assert_eq!(sessions.status, StatusCode::OK);
    let list = sessions.body["data"].as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert!(list[0].get("token_hash").is_none());
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let app = TestApp::new().await;
    register(&app, "twice@example.com").await;
    let response = register(&app, "Twice@Example.com").await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["error"], "CONFLICT");
}

#[tokio::test]
async fn test_login_failures_are_identical() {
    let app = TestApp::new().await;
    register(&app, "same@example.com").await;

    let wrong = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({"email": "same@example.com", "password": "Wrong-Passw0rd!"})),
            None,
        )
        .await;
    let unknown = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({"email": "other@example.com", "password": PASSWORD})),
            None,
        )
        .await;

    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.status, unknown.status);
    assert_eq!(wrong.body, unknown.body);
}

#[tokio::test]
async fn test_lockout_returns_locked_with_retry_after() {
    let app = TestApp::new().await;
    register(&app, "locked@example.com").await;

    for _ in 0..3 {
        app.request(
            "POST",
            "/api/auth/login",
            Some(json!({"email": "locked@example.com", "password": "Wrong-Passw0rd!"})),
            None,
        )
        .await;
    }
    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({"email": "locked@example.com", "password": PASSWORD})),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::LOCKED);
    assert!(response.retry_after.is_some());
}

#[tokio::test]
async fn test_logout_blacklists_access_token() {
    let app = TestApp::new().await;
    let registered = register(&app, "bye@example.com").await;
    let access = registered.data_str("access_token");
    let refresh = registered.data_str("refresh_token");

    let response = app
        .request(
            "POST",
            "/api/auth/logout",
            Some(json!({"refresh_token": refresh})),
            Some(&access),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let me = app.request("GET", "/api/auth/me", None, Some(&access)).await;
    assert_eq!(me.status, StatusCode::UNAUTHORIZED);

    let refreshed = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(json!({"refresh_token": refresh})),
            None,
        )
        .await;
    assert_eq!(refreshed.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_rotates_over_http() {
    let app = TestApp::new().await;
    let registered = register(&app, "rotate@example.com").await;
    let refresh = registered.data_str("refresh_token");

    let first = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(json!({"refresh_token": refresh})),
            None,
        )
        .await;
    assert_eq!(first.status, StatusCode::OK);
    assert_ne!(first.data_str("refresh_token"), refresh);

    let replay = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(json!({"refresh_token": refresh})),
            None,
        )
        .await;
    assert_eq!(replay.status, StatusCode::UNAUTHORIZED);
    assert_eq!(replay.body["message"], "Invalid refresh token");
}

#[tokio::test]
async fn test_forgot_password_answers_identically() {
    let app = TestApp::new().await;
    register(&app, "forgot@example.com").await;

    let known = app
        .request(
            "POST",
            "/api/auth/forgot-password",
            Some(json!({"email": "forgot@example.com"})),
            None,
        )
        .await;
    let unknown = app
        .request(
            "POST",
            "/api/auth/forgot-password",
            Some(json!({"email": "ghost@example.com"})),
            None,
        )
        .await;

    assert_eq!(known.status, StatusCode::ACCEPTED);
    assert_eq!(known.status, unknown.status);
    assert_eq!(known.body, unknown.body);
}

#[tokio::test]
async fn test_reset_password_with_unknown_token() {
    let app = TestApp::new().await;
    let response = app
        .request(
            "POST",
            "/api/auth/reset-password",
            Some(json!({"reset_token": "bogus", "new_password": NEW_PASSWORD})),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_revoke_session_over_http() {
    let app = TestApp::new().await;
    let mine = register(&app, "owner@example.com").await;
    let theirs = register(&app, "stranger@example.com").await;
    let access = mine.data_str("access_token");

    let foreign = app
        .request(
            "DELETE",
            &format!("/api/auth/sessions/{}", theirs.data_str("session_id")),
            None,
            Some(&access),
        )
        .await;
    assert_eq!(foreign.status, StatusCode::NOT_FOUND);

    let own = app
        .request(
            "DELETE",
            &format!("/api/auth/sessions/{}", mine.data_str("session_id")),
            None,
            Some(&access),
        )
        .await;
    assert_eq!(own.status, StatusCode::NO_CONTENT);

    let sessions = app
        .request("GET", "/api/auth/sessions", None, Some(&access))
        .await;
    assert!(sessions.body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_rate_limit_on_public_routes() {
    let app = TestApp::with_options(TestOptions {
        burst_size: 2,
        ..TestOptions::default()
    })
    .await;

    let mut statuses = Vec::new();
    for _ in 0..3 {
        let response = app
            .request(
                "POST",
                "/api/auth/forgot-password",
                Some(json!({"email": "spam@example.com"})),
                None,
            )
            .await;
        statuses.push((response.status, response.retry_after));
    }

    assert_eq!(statuses[0].0, StatusCode::ACCEPTED);
    assert_eq!(statuses[1].0, StatusCode::ACCEPTED);
    assert_eq!(statuses[2].0, StatusCode::TOO_MANY_REQUESTS);
    assert!(statuses[2].1.is_some());
}
