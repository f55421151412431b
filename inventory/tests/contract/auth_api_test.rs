//! 認証API Contract Tests
//!
//! POST /login, POST /logout, POST /refresh, GET /me, GET /health

use crate::support::app::{
    create_test_app, login, seed_user, send, send_request, set_user_state, TEST_JWT_SECRET,
    TEST_PASSWORD,
};
use asset_inventory::auth::jwt::create_jwt;
use asset_inventory::common::auth::UserRole;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::json;

#[tokio::test]
async fn test_login_success_shape() {
    let (app, pool) = create_test_app().await;
    seed_user(&pool, "Admin", "admin@example.com", UserRole::Admin).await;

    let (status, body) = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({ "email": "admin@example.com", "password": TEST_PASSWORD })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User successfully logged in");
    assert_eq!(body["user"]["email"], "admin@example.com");
    assert_eq!(body["user"]["role"], "admin");
    assert_eq!(body["user"]["is_active"], true);
    assert!(body["user"].get("password_hash").is_none());
    assert!(body["authorization"]["token"].is_string());
    assert_eq!(body["authorization"]["type"], "bearer");
    assert_eq!(body["authorization"]["expires_in"], 86400);
}

#[tokio::test]
async fn test_login_wrong_password_and_unknown_email_are_401() {
    let (app, pool) = create_test_app().await;
    seed_user(&pool, "Admin", "admin@example.com", UserRole::Admin).await;

    let (status, body) = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({ "email": "admin@example.com", "password": "wrong-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");

    let (status, _) = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({ "email": "ghost@example.com", "password": TEST_PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_email_ignores_case() {
    let (app, pool) = create_test_app().await;
    seed_user(&pool, "Admin", "admin@example.com", UserRole::Admin).await;

    let (status, body) = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({ "email": "ADMIN@Example.com", "password": TEST_PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "admin@example.com");
}

#[tokio::test]
async fn test_login_missing_fields_is_422() {
    let (app, _pool) = create_test_app().await;

    let (status, body) = send(&app, "POST", "/login", None, Some(json!({}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "Validation failed");
    assert_eq!(body["errors"]["email"][0], "The email field is required.");
    assert_eq!(body["errors"]["password"][0], "The password field is required.");
}

#[tokio::test]
async fn test_login_malformed_json_is_422() {
    let (app, _pool) = create_test_app().await;
    let request = Request::builder()
        .method("POST")
        .uri("/login")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, body) = send_request(&app, request).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["body"].is_array());
}

#[tokio::test]
async fn test_inactive_account_cannot_login() {
    let (app, pool) = create_test_app().await;
    let user = seed_user(&pool, "Old", "old@example.com", UserRole::Auditor).await;
    set_user_state(&pool, &user, UserRole::Auditor, false).await;

    let (status, body) = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({ "email": "old@example.com", "password": TEST_PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Account inactive");
    assert!(body.get("authorization").is_none());
}

#[tokio::test]
async fn test_me_returns_profile() {
    let (app, pool) = create_test_app().await;
    seed_user(&pool, "Head", "head@example.com", UserRole::DepartmentHead).await;
    let token = login(&app, "head@example.com").await;

    let (status, body) = send(&app, "GET", "/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Head");
    assert_eq!(body["role"], "department-head");
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn test_missing_or_invalid_token_is_401() {
    let (app, _pool) = create_test_app().await;

    let (status, body) = send(&app, "GET", "/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Unauthenticated");

    let (status, _) = send(&app, "GET", "/me", Some("not.a.jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let forged = create_jwt(1, UserRole::Admin, "some-other-secret").unwrap();
    let (status, _) = send(&app, "GET", "/departments", Some(&forged), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_for_deleted_user_is_401() {
    let (app, _pool) = create_test_app().await;
    let token = create_jwt(4242, UserRole::Admin, TEST_JWT_SECRET).unwrap();

    let (status, _) = send(&app, "GET", "/departments", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_deactivated_user_token_is_403() {
    let (app, pool) = create_test_app().await;
    let user = seed_user(&pool, "Head", "head@example.com", UserRole::DepartmentHead).await;
    let token = login(&app, "head@example.com").await;

    let (status, _) = send(&app, "GET", "/assets", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    set_user_state(&pool, &user, UserRole::DepartmentHead, false).await;
    let (status, body) = send(&app, "GET", "/assets", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Account inactive");
}

#[tokio::test]
async fn test_refresh_issues_usable_token() {
    let (app, pool) = create_test_app().await;
    seed_user(&pool, "Auditor", "auditor@example.com", UserRole::Auditor).await;
    let token = login(&app, "auditor@example.com").await;

    let (status, body) = send(&app, "POST", "/refresh", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "bearer");
    assert_eq!(body["expires_in"], 86400);
    let new_token = body["new_access_token"].as_str().unwrap();

    let (status, body) = send(&app, "GET", "/me", Some(new_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "auditor@example.com");
}

#[tokio::test]
async fn test_logout_requires_token() {
    let (app, pool) = create_test_app().await;
    seed_user(&pool, "Admin", "admin@example.com", UserRole::Admin).await;
    let token = login(&app, "admin@example.com").await;

    let (status, body) = send(&app, "POST", "/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Successfully logged out");

    let (status, _) = send(&app, "POST", "/logout", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health_is_public() {
    let (app, _pool) = create_test_app().await;
    let (status, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::Value::String("ok".to_string()));
}
