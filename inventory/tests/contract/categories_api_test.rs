//! カテゴリAPI Contract Tests

use crate::support::app::{audit_logs, create_test_app, seed_basics, seed_role_tokens, send};
use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_category_crud() {
    let (app, pool) = create_test_app().await;
    let tokens = seed_role_tokens(&app, &pool).await;

    let (status, body) = send(
        &app,
        "POST",
        "/categories",
        Some(&tokens.admin),
        Some(json!({ "name": "Laptop" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Category created successfully");
    let id = body["data"]["id"].as_i64().unwrap();
    let uri = format!("/categories/{}", id);

    let (status, body) = send(
        &app,
        "PUT",
        &uri,
        Some(&tokens.admin),
        Some(json!({ "name": "Notebook" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Notebook");

    let (status, body) = send(&app, "GET", &uri, Some(&tokens.auditor), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Notebook");

    let (status, _) = send(&app, "DELETE", &uri, Some(&tokens.admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "GET", &uri, Some(&tokens.auditor), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let logs = audit_logs(&app, &tokens.admin).await;
    let descriptions: Vec<&str> = logs
        .iter()
        .map(|l| l["description"].as_str().unwrap())
        .collect();
    assert_eq!(
        descriptions,
        vec![
            "Deleted category: Notebook",
            "Renamed category: 'Laptop' -> 'Notebook'",
            "Created category: Laptop",
        ]
    );
}

#[tokio::test]
async fn test_category_name_rules() {
    let (app, pool) = create_test_app().await;
    let tokens = seed_role_tokens(&app, &pool).await;

    let (status, body) = send(
        &app,
        "POST",
        "/categories",
        Some(&tokens.admin),
        Some(json!({ "name": "x".repeat(51) })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["errors"]["name"][0],
        "The name may not be greater than 50 characters."
    );

    let (status, _) = send(
        &app,
        "POST",
        "/categories",
        Some(&tokens.admin),
        Some(json!({ "name": "x".repeat(50) })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        "POST",
        "/categories",
        Some(&tokens.admin),
        Some(json!({ "name": "x".repeat(50) })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["name"][0], "The name has already been taken.");

    let (status, body) = send(
        &app,
        "POST",
        "/categories",
        Some(&tokens.admin),
        Some(json!({ "name": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["name"][0], "The name field is required.");
}

#[tokio::test]
async fn test_category_with_live_asset_cannot_be_deleted() {
    let (app, pool) = create_test_app().await;
    let tokens = seed_role_tokens(&app, &pool).await;
    let (_, category_id, employee_id) = seed_basics(&app, &tokens.admin).await;
    send(
        &app,
        "POST",
        "/assets",
        Some(&tokens.admin),
        Some(json!({
            "inventory_code": "AST-001",
            "category_id": category_id,
            "employee_id": employee_id,
            "brand": "Dell",
            "model": "Latitude"
        })),
    )
    .await;

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/categories/{}", category_id),
        Some(&tokens.admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body["message"],
        "Cannot delete category: it has 1 registered asset(s)."
    );
}
