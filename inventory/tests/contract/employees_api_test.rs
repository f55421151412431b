//! 従業員API Contract Tests

use crate::support::app::{audit_logs, create_test_app, seed_basics, seed_role_tokens, send};
use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_employee_create_defaults_and_audit() {
    let (app, pool) = create_test_app().await;
    let tokens = seed_role_tokens(&app, &pool).await;
    let (department_id, _, employee_id) = seed_basics(&app, &tokens.admin).await;

    let (status, body) = send(
        &app,
        "GET",
        &format!("/employees/{}", employee_id),
        Some(&tokens.department_head),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["first_name"], "Ana");
    assert_eq!(body["status"], "active");
    assert_eq!(body["department_id"], department_id);
    assert_eq!(body["department"]["name"], "Finance");
    assert_eq!(body["assets"].as_array().unwrap().len(), 0);

    let logs = audit_logs(&app, &tokens.admin).await;
    assert_eq!(logs[0]["table_name"], "employees");
    assert_eq!(logs[0]["action"], "CREATE");
    assert_eq!(logs[0]["description"], "Created employee: Ana Ruiz");
}

#[tokio::test]
async fn test_employee_validation() {
    let (app, pool) = create_test_app().await;
    let tokens = seed_role_tokens(&app, &pool).await;
    seed_basics(&app, &tokens.admin).await;

    let (status, body) = send(&app, "POST", "/employees", Some(&tokens.admin), Some(json!({}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    for field in ["first_name", "last_name", "department_id"] {
        assert!(body["errors"][field].is_array(), "missing error for {}", field);
    }

    let (status, body) = send(
        &app,
        "POST",
        "/employees",
        Some(&tokens.admin),
        Some(json!({
            "first_name": "Luis",
            "last_name": "Perez",
            "email": "not-an-email",
            "department_id": 999,
            "status": "on-vacation"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["errors"]["email"][0],
        "The email must be a valid email address."
    );
    assert_eq!(
        body["errors"]["department_id"][0],
        "The selected department_id is invalid."
    );
    assert_eq!(body["errors"]["status"][0], "The selected status is invalid.");

    let (status, body) = send(
        &app,
        "POST",
        "/employees",
        Some(&tokens.admin),
        Some(json!({
            "first_name": "Luis",
            "last_name": "Perez",
            "email": "ana.ruiz@example.com",
            "department_id": 1
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["email"][0], "The email has already been taken.");

    let (status, body) = send(
        &app,
        "POST",
        "/employees",
        Some(&tokens.admin),
        Some(json!({ "first_name": "x".repeat(101), "last_name": "Perez", "department_id": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["first_name"].is_array());

    // 検証エラーでは監査ログを書かない（seed_basicsの3件のみ）
    assert_eq!(audit_logs(&app, &tokens.admin).await.len(), 3);
}

#[tokio::test]
async fn test_employee_update_keeps_status_when_omitted() {
    let (app, pool) = create_test_app().await;
    let tokens = seed_role_tokens(&app, &pool).await;
    let (department_id, _, employee_id) = seed_basics(&app, &tokens.admin).await;
    let uri = format!("/employees/{}", employee_id);

    let (status, body) = send(
        &app,
        "PUT",
        &uri,
        Some(&tokens.admin),
        Some(json!({
            "first_name": "Ana",
            "last_name": "Ruiz",
            "department_id": department_id,
            "status": "inactive"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "inactive");
    assert!(body["data"]["email"].is_null());

    let (status, body) = send(
        &app,
        "PUT",
        &uri,
        Some(&tokens.admin),
        Some(json!({
            "first_name": "Ana Maria",
            "last_name": "Ruiz",
            "email": "ana.ruiz@example.com",
            "department_id": department_id
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "inactive");
    assert_eq!(body["data"]["email"], "ana.ruiz@example.com");
    assert_eq!(body["message"], "Employee updated successfully");

    let logs = audit_logs(&app, &tokens.admin).await;
    assert_eq!(logs[0]["description"], "Updated employee: Ana Maria Ruiz");
}

#[tokio::test]
async fn test_employee_list_filters() {
    let (app, pool) = create_test_app().await;
    let tokens = seed_role_tokens(&app, &pool).await;
    let (finance_id, _, _) = seed_basics(&app, &tokens.admin).await;
    let (_, it) = send(
        &app,
        "POST",
        "/departments",
        Some(&tokens.admin),
        Some(json!({ "name": "IT" })),
    )
    .await;
    let it_id = it["data"]["id"].as_i64().unwrap();
    send(
        &app,
        "POST",
        "/employees",
        Some(&tokens.admin),
        Some(json!({ "first_name": "Luis", "last_name": "Perez", "department_id": it_id })),
    )
    .await;

    let (_, body) = send(&app, "GET", "/employees", Some(&tokens.auditor), None).await;
    let last_names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["last_name"].as_str().unwrap())
        .collect();
    assert_eq!(last_names, vec!["Perez", "Ruiz"]);
    assert_eq!(body[0]["department"]["name"], "IT");

    let (_, body) = send(
        &app,
        "GET",
        &format!("/employees?department_id={}", finance_id),
        Some(&tokens.auditor),
        None,
    )
    .await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["first_name"], "Ana");

    let (_, body) = send(&app, "GET", "/employees?search=luis", Some(&tokens.auditor), None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["last_name"], "Perez");

    let (status, body) = send(
        &app,
        "GET",
        "/employees?department_id=abc",
        Some(&tokens.auditor),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["department_id"].is_array());
}

#[tokio::test]
async fn test_employee_with_live_asset_cannot_be_deleted() {
    let (app, pool) = create_test_app().await;
    let tokens = seed_role_tokens(&app, &pool).await;
    let (_, category_id, employee_id) = seed_basics(&app, &tokens.admin).await;
    let (status, asset) = send(
        &app,
        "POST",
        "/assets",
        Some(&tokens.admin),
        Some(json!({
            "inventory_code": "AST-001",
            "category_id": category_id,
            "employee_id": employee_id,
            "brand": "Dell",
            "model": "Latitude 5440"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let asset_id = asset["data"]["id"].as_i64().unwrap();
    let employee_uri = format!("/employees/{}", employee_id);

    let (_, body) = send(&app, "GET", &employee_uri, Some(&tokens.admin), None).await;
    assert_eq!(body["assets"][0]["inventory_code"], "AST-001");

    let (status, body) = send(&app, "DELETE", &employee_uri, Some(&tokens.admin), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body["message"],
        "Cannot delete employee: they have 1 assigned asset(s)."
    );

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/assets/{}", asset_id),
        Some(&tokens.admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "DELETE", &employee_uri, Some(&tokens.admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Employee deleted successfully");

    let (status, _) = send(&app, "GET", &employee_uri, Some(&tokens.admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_employee_search_folds_accented_case() {
    let (app, pool) = create_test_app().await;
    let tokens = seed_role_tokens(&app, &pool).await;
    let (department_id, _, _) = seed_basics(&app, &tokens.admin).await;
    let (status, _) = send(
        &app,
        "POST",
        "/employees",
        Some(&tokens.admin),
        Some(json!({
            "first_name": "José",
            "last_name": "Núñez",
            "email": "Jose.Nunez@Example.com",
            "department_id": department_id
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // NÚÑEZ
    let (_, body) = send(
        &app,
        "GET",
        "/employees?search=N%C3%9A%C3%91EZ",
        Some(&tokens.auditor),
        None,
    )
    .await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["first_name"], "José");

    let (status, body) = send(
        &app,
        "POST",
        "/employees",
        Some(&tokens.admin),
        Some(json!({
            "first_name": "Pepe",
            "last_name": "Nunez",
            "email": "jose.nunez@example.com",
            "department_id": department_id
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["email"][0], "The email has already been taken.");
}
