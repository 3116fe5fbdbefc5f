//! Auth API tests.
//!
//! These tests require a running PostgreSQL database.
//! Set DATABASE_URL before running.

mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::Duration;

use common::fixtures;
use common::TestContext;

/// Health check responds without credentials.
#[tokio::test]
#[ignore = "requires database"]
async fn test_health_check() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();

    let response = server.get("/health").await;
    response.assert_status_ok();
    response.assert_text("OK");
}

/// Registration issues a credential pair and the password never leaks.
#[tokio::test]
#[ignore = "requires database"]
async fn test_register_issues_credentials() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let email = fixtures::unique_email("register");

    let response = server
        .post("/api/auth/register")
        .json(&fixtures::register_request(&email, "password123"))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    assert!(!body["access_token"].as_str().unwrap().is_empty());
    assert!(!body["refresh_token"].as_str().unwrap().is_empty());
    assert_eq!(body["user"]["email"], email);
    assert!(body["user"].get("password_hash").is_none());

    let user_id = body["user"]["id"].as_i64().unwrap();
    ctx.cleanup_user(user_id).await;
}

/// Second registration with the same email conflicts.
#[tokio::test]
#[ignore = "requires database"]
async fn test_register_duplicate_email_conflicts() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let email = fixtures::unique_email("dup");

    let first = server
        .post("/api/auth/register")
        .json(&fixtures::register_request(&email, "password123"))
        .await;
    first.assert_status(StatusCode::CREATED);
    let user_id = first.json::<serde_json::Value>()["user"]["id"]
        .as_i64()
        .unwrap();

    let second = server
        .post("/api/auth/register")
        .json(&fixtures::register_request(&email, "password456"))
        .await;
    second.assert_status(StatusCode::CONFLICT);

    ctx.cleanup_user(user_id).await;
}

/// Login works with the registered password.
#[tokio::test]
#[ignore = "requires database"]
async fn test_login_with_valid_credentials() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let email = fixtures::unique_email("login");
    let auth = ctx.register_user(&email).await;

    let response = server
        .post("/api/auth/login")
        .json(&fixtures::login_request(&email, TestContext::test_password()))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["user"]["id"].as_i64().unwrap(), auth.user.id);

    ctx.cleanup_user(auth.user.id).await;
}

/// Wrong password and unknown email are indistinguishable to a caller.
#[tokio::test]
#[ignore = "requires database"]
async fn test_login_failures_are_indistinguishable() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let email = fixtures::unique_email("enum");
    let auth = ctx.register_user(&email).await;

    let wrong_password = server
        .post("/api/auth/login")
        .json(&fixtures::login_request(&email, "not-the-password"))
        .await;
    let unknown_email = server
        .post("/api/auth/login")
        .json(&fixtures::login_request(
            &fixtures::unique_email("ghost"),
            "whatever",
        ))
        .await;

    wrong_password.assert_status(StatusCode::UNAUTHORIZED);
    unknown_email.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(
        wrong_password.json::<serde_json::Value>(),
        unknown_email.json::<serde_json::Value>()
    );

    ctx.cleanup_user(auth.user.id).await;
}

/// Refresh rotates the pair; the consumed token is dead afterwards.
#[tokio::test]
#[ignore = "requires database"]
async fn test_refresh_is_single_use() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let auth = ctx.register_user(&fixtures::unique_email("rotate")).await;

    let first = server
        .post("/api/auth/refresh")
        .json(&fixtures::refresh_request(&auth.refresh_token))
        .await;
    first.assert_status_ok();
    let rotated: serde_json::Value = first.json();
    assert_ne!(rotated["refresh_token"], auth.refresh_token);

    // Replaying the consumed token fails.
    let replay = server
        .post("/api/auth/refresh")
        .json(&fixtures::refresh_request(&auth.refresh_token))
        .await;
    replay.assert_status(StatusCode::UNAUTHORIZED);

    // The rotated token still works.
    let second = server
        .post("/api/auth/refresh")
        .json(&fixtures::refresh_request(
            rotated["refresh_token"].as_str().unwrap(),
        ))
        .await;
    second.assert_status_ok();

    ctx.cleanup_user(auth.user.id).await;
}

/// Logout revokes the refresh token; a second logout is rejected.
#[tokio::test]
#[ignore = "requires database"]
async fn test_logout_revokes_refresh_token() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let auth = ctx.register_user(&fixtures::unique_email("logout")).await;

    let response = server
        .post("/api/auth/logout")
        .json(&fixtures::refresh_request(&auth.refresh_token))
        .await;
    response.assert_status_ok();

    let again = server
        .post("/api/auth/logout")
        .json(&fixtures::refresh_request(&auth.refresh_token))
        .await;
    again.assert_status(StatusCode::UNAUTHORIZED);

    let refresh = server
        .post("/api/auth/refresh")
        .json(&fixtures::refresh_request(&auth.refresh_token))
        .await;
    refresh.assert_status(StatusCode::UNAUTHORIZED);

    ctx.cleanup_user(auth.user.id).await;
}

/// Protected routes reject missing and malformed credentials.
#[tokio::test]
#[ignore = "requires database"]
async fn test_protected_route_requires_bearer_token() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();

    let missing = server.get("/api/user/profile").await;
    missing.assert_status(StatusCode::UNAUTHORIZED);

    let garbage = server
        .get("/api/user/profile")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value("not-a-jwt"),
        )
        .await;
    garbage.assert_status(StatusCode::UNAUTHORIZED);
}

/// An expired access token plus a valid refresh token renews the pair
/// in place and hands the replacements back in response headers.
#[tokio::test]
#[ignore = "requires database"]
async fn test_expired_token_renews_via_refresh_header() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let auth = ctx.register_user(&fixtures::unique_email("renew")).await;

    // Past the verifier's leeway.
    let expired = ctx
        .signer()
        .issue_with_validity(&auth.user, Duration::seconds(-120))
        .unwrap();

    let without_refresh = server
        .get("/api/user/profile")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&expired),
        )
        .await;
    without_refresh.assert_status(StatusCode::UNAUTHORIZED);

    let response = server
        .get("/api/user/profile")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&expired),
        )
        .add_header("x-refresh-token", auth.refresh_token.as_str())
        .await;

    response.assert_status_ok();
    let new_access = response
        .headers()
        .get("x-new-access-token")
        .and_then(|h| h.to_str().ok())
        .expect("renewed access token header")
        .to_string();
    let new_refresh = response
        .headers()
        .get("x-new-refresh-token")
        .and_then(|h| h.to_str().ok())
        .expect("renewed refresh token header")
        .to_string();
    assert_ne!(new_refresh, auth.refresh_token);

    // The replacement access token works on its own.
    let follow_up = server
        .get("/api/user/profile")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&new_access),
        )
        .await;
    follow_up.assert_status_ok();

    ctx.cleanup_user(auth.user.id).await;
}
