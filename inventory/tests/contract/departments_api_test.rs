//! 部署API Contract Tests

use crate::support::app::{audit_logs, create_test_app, seed_role_tokens, send};
use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_department_crud_with_audit() {
    let (app, pool) = create_test_app().await;
    let tokens = seed_role_tokens(&app, &pool).await;

    let (status, body) = send(
        &app,
        "POST",
        "/departments",
        Some(&tokens.admin),
        Some(json!({ "name": "Finance", "description": "Money matters" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Department created successfully");
    assert_eq!(body["data"]["name"], "Finance");
    let id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "GET",
        &format!("/departments/{}", id),
        Some(&tokens.auditor),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["description"], "Money matters");

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/departments/{}", id),
        Some(&tokens.admin),
        Some(json!({ "name": "Accounting" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Accounting");
    assert!(body["data"]["description"].is_null());

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/departments/{}", id),
        Some(&tokens.admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Department deleted successfully");

    let logs = audit_logs(&app, &tokens.admin).await;
    let descriptions: Vec<&str> = logs
        .iter()
        .map(|l| l["description"].as_str().unwrap())
        .collect();
    assert_eq!(
        descriptions,
        vec![
            "Deleted department: 'Accounting'",
            "Updated department: 'Finance' -> 'Accounting'",
            "Created department: Finance",
        ]
    );
    assert!(logs.iter().all(|l| l["table_name"] == "departments"));
    assert!(logs.iter().all(|l| l["record_id"] == id.to_string()));
    assert_eq!(logs[0]["action"], "DELETE");
    assert_eq!(logs[2]["user"]["email"], "admin@example.com");
}

#[tokio::test]
async fn test_department_validation() {
    let (app, pool) = create_test_app().await;
    let tokens = seed_role_tokens(&app, &pool).await;

    let (status, body) = send(&app, "POST", "/departments", Some(&tokens.admin), Some(json!({}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["name"][0], "The name field is required.");

    let (status, body) = send(
        &app,
        "POST",
        "/departments",
        Some(&tokens.admin),
        Some(json!({ "name": "x".repeat(256) })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["name"].is_array());

    send(&app, "POST", "/departments", Some(&tokens.admin), Some(json!({ "name": "Finance" }))).await;
    let (status, body) = send(
        &app,
        "POST",
        "/departments",
        Some(&tokens.admin),
        Some(json!({ "name": "Finance" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["name"][0], "The name has already been taken.");

    // 自分自身の名前は重複扱いしない
    let (status, _) = send(
        &app,
        "PUT",
        "/departments/1",
        Some(&tokens.admin),
        Some(json!({ "name": "Finance", "description": "same name" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(audit_logs(&app, &tokens.admin).await.len(), 2);
}

#[tokio::test]
async fn test_department_not_found() {
    let (app, pool) = create_test_app().await;
    let tokens = seed_role_tokens(&app, &pool).await;

    let (status, body) = send(&app, "GET", "/departments/99", Some(&tokens.admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not found");

    let (status, _) = send(
        &app,
        "PUT",
        "/departments/99",
        Some(&tokens.admin),
        Some(json!({ "name": "Ghost" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "DELETE", "/departments/99", Some(&tokens.admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(audit_logs(&app, &tokens.admin).await.is_empty());
}

#[tokio::test]
async fn test_department_with_employees_cannot_be_deleted() {
    let (app, pool) = create_test_app().await;
    let tokens = seed_role_tokens(&app, &pool).await;
    let (_, body) = send(
        &app,
        "POST",
        "/departments",
        Some(&tokens.admin),
        Some(json!({ "name": "Finance" })),
    )
    .await;
    let id = body["data"]["id"].as_i64().unwrap();
    send(
        &app,
        "POST",
        "/employees",
        Some(&tokens.admin),
        Some(json!({ "first_name": "Ana", "last_name": "Ruiz", "department_id": id })),
    )
    .await;

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/departments/{}", id),
        Some(&tokens.admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Cannot delete");
    assert_eq!(
        body["message"],
        "Cannot delete department: it has 1 assigned employee(s)."
    );

    let (status, _) = send(
        &app,
        "GET",
        &format!("/departments/{}", id),
        Some(&tokens.admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let logs = audit_logs(&app, &tokens.admin).await;
    assert!(logs.iter().all(|l| l["action"] != "DELETE"));
}

#[tokio::test]
async fn test_department_list_is_sorted_and_searchable() {
    let (app, pool) = create_test_app().await;
    let tokens = seed_role_tokens(&app, &pool).await;
    for (name, description) in [("Sales", "Revenue"), ("Finance", "Ledger"), ("IT", "Help desk")] {
        send(
            &app,
            "POST",
            "/departments",
            Some(&tokens.admin),
            Some(json!({ "name": name, "description": description })),
        )
        .await;
    }

    let (_, body) = send(&app, "GET", "/departments", Some(&tokens.auditor), None).await;
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Finance", "IT", "Sales"]);

    let (_, body) = send(
        &app,
        "GET",
        "/departments?search=LEDG",
        Some(&tokens.auditor),
        None,
    )
    .await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["name"], "Finance");

    let (_, body) = send(&app, "GET", "/departments?search=", Some(&tokens.auditor), None).await;
    assert_eq!(body.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_department_search_and_uniqueness_ignore_accented_case() {
    let (app, pool) = create_test_app().await;
    let tokens = seed_role_tokens(&app, &pool).await;
    for name in ["Ingeniería", "Finance"] {
        let (status, _) = send(
            &app,
            "POST",
            "/departments",
            Some(&tokens.admin),
            Some(json!({ "name": name })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    // INGENIERÍA
    let (status, body) = send(
        &app,
        "GET",
        "/departments?search=INGENIER%C3%8DA",
        Some(&tokens.auditor),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["name"], "Ingeniería");

    for duplicate in ["finance", "FINANCE", "INGENIERÍA"] {
        let (status, body) = send(
            &app,
            "POST",
            "/departments",
            Some(&tokens.admin),
            Some(json!({ "name": duplicate })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{} was accepted", duplicate);
        assert_eq!(body["errors"]["name"][0], "The name has already been taken.");
    }

    let (_, body) = send(&app, "GET", "/departments", Some(&tokens.auditor), None).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
}
