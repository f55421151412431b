//! ユーザー管理API Contract Tests

use crate::support::app::{audit_logs, create_test_app, seed_role_tokens, send};
use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_user_list_excludes_caller_and_hides_hash() {
    let (app, pool) = create_test_app().await;
    let tokens = seed_role_tokens(&app, &pool).await;

    let (status, body) = send(&app, "GET", "/users", Some(&tokens.admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let emails: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["email"].as_str().unwrap())
        .collect();
    assert_eq!(emails, vec!["head@example.com", "auditor@example.com"]);
    assert_eq!(body[0]["role"], "department-head");
    assert!(!body.to_string().contains("password"));
}

#[tokio::test]
async fn test_user_create_and_login() {
    let (app, pool) = create_test_app().await;
    let tokens = seed_role_tokens(&app, &pool).await;

    let (status, body) = send(
        &app,
        "POST",
        "/users",
        Some(&tokens.admin),
        Some(json!({
            "name": "Marta",
            "email": "marta@example.com",
            "password": "secret1",
            "role": "auditor"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["message"], "User created successfully");
    assert_eq!(body["data"]["role"], "auditor");
    assert_eq!(body["data"]["is_active"], true);
    assert!(body["data"].get("password_hash").is_none());

    let (status, _) = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({ "email": "marta@example.com", "password": "secret1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let logs = audit_logs(&app, &tokens.admin).await;
    assert_eq!(logs[0]["table_name"], "users");
    assert_eq!(logs[0]["description"], "Created user: marta@example.com (auditor)");
}

#[tokio::test]
async fn test_user_create_inactive() {
    let (app, pool) = create_test_app().await;
    let tokens = seed_role_tokens(&app, &pool).await;

    let (status, body) = send(
        &app,
        "POST",
        "/users",
        Some(&tokens.admin),
        Some(json!({
            "name": "Old",
            "email": "old@example.com",
            "password": "secret1",
            "role": "auditor",
            "is_active": false
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["is_active"], false);

    let (status, _) = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({ "email": "old@example.com", "password": "secret1" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_user_validation() {
    let (app, pool) = create_test_app().await;
    let tokens = seed_role_tokens(&app, &pool).await;

    let (status, body) = send(
        &app,
        "POST",
        "/users",
        Some(&tokens.admin),
        Some(json!({
            "name": "Short",
            "email": "head@example.com",
            "password": "12345",
            "role": "superuser"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["errors"]["password"][0],
        "The password must be at least 6 characters."
    );
    assert_eq!(body["errors"]["email"][0], "The email has already been taken.");
    assert_eq!(body["errors"]["role"][0], "The selected role is invalid.");

    let (status, body) = send(
        &app,
        "POST",
        "/users",
        Some(&tokens.admin),
        Some(json!({
            "name": "Second Admin",
            "email": "ADMIN@Example.com",
            "password": "password123",
            "role": "admin"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["email"][0], "The email has already been taken.");

    let (status, body) = send(&app, "POST", "/users", Some(&tokens.admin), Some(json!({}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    for field in ["name", "email", "password", "role"] {
        assert!(body["errors"][field].is_array(), "missing error for {}", field);
    }
}

#[tokio::test]
async fn test_user_update_and_password_reset() {
    let (app, pool) = create_test_app().await;
    let tokens = seed_role_tokens(&app, &pool).await;

    let (status, body) = send(
        &app,
        "PUT",
        "/users/2",
        Some(&tokens.admin),
        Some(json!({ "name": "Head", "email": "head@example.com", "role": "auditor" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "auditor");

    let (status, _) = send(
        &app,
        "PUT",
        "/users/2",
        Some(&tokens.admin),
        Some(json!({
            "name": "Head",
            "email": "head@example.com",
            "role": "auditor",
            "password": "newpass1"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({ "email": "head@example.com", "password": "newpass1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let logs = audit_logs(&app, &tokens.admin).await;
    assert_eq!(logs[0]["description"], "Updated user: head@example.com Password reset.");
    assert_eq!(logs[1]["description"], "Updated user: head@example.com");

    let (status, _) = send(
        &app,
        "PUT",
        "/users/99",
        Some(&tokens.admin),
        Some(json!({ "name": "X", "email": "x@example.com", "role": "admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleted_user_keeps_audit_history() {
    let (app, pool) = create_test_app().await;
    let tokens = seed_role_tokens(&app, &pool).await;

    let (_, created) = send(
        &app,
        "POST",
        "/users",
        Some(&tokens.admin),
        Some(json!({
            "name": "Temp Admin",
            "email": "temp@example.com",
            "password": "secret1",
            "role": "admin"
        })),
    )
    .await;
    let temp_id = created["data"]["id"].as_i64().unwrap();
    let (_, login) = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({ "email": "temp@example.com", "password": "secret1" })),
    )
    .await;
    let temp_token = login["authorization"]["token"].as_str().unwrap().to_string();
    let (status, _) = send(
        &app,
        "POST",
        "/departments",
        Some(&temp_token),
        Some(json!({ "name": "Temp Dept" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/users/{}", temp_id),
        Some(&tokens.admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User deleted successfully");

    // 削除済みユーザーのトークンは使えない
    let (status, _) = send(&app, "GET", "/me", Some(&temp_token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let logs = audit_logs(&app, &tokens.admin).await;
    assert_eq!(logs[0]["description"], "Deleted user: temp@example.com");
    let dept_log = logs
        .iter()
        .find(|l| l["table_name"] == "departments")
        .unwrap();
    assert_eq!(dept_log["user_id"], temp_id);
    assert!(dept_log["user"].is_null());
}
