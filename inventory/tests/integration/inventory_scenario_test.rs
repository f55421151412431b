//! 在庫管理の一連の業務フロー
//!
//! 部署・従業員・カテゴリ・資産の登録から、参照整合性による削除拒否、
//! 論理削除後の削除成功までを監査ログと合わせて確認する。

use crate::support::app::{audit_logs, create_test_app, seed_role_tokens, send};
use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_asset_lifecycle_with_referential_integrity() {
    let (app, pool) = create_test_app().await;
    let tokens = seed_role_tokens(&app, &pool).await;
    let admin = Some(tokens.admin.as_str());

    let (status, finance) = send(
        &app,
        "POST",
        "/departments",
        admin,
        Some(json!({ "name": "Finance", "description": "Accounting and payroll" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let finance_id = finance["data"]["id"].as_i64().unwrap();

    let (status, ana) = send(
        &app,
        "POST",
        "/employees",
        admin,
        Some(json!({
            "first_name": "Ana",
            "last_name": "Ruiz",
            "email": "ana.ruiz@example.com",
            "department_id": finance_id
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let ana_id = ana["data"]["id"].as_i64().unwrap();

    let (status, laptop) = send(
        &app,
        "POST",
        "/categories",
        admin,
        Some(json!({ "name": "Laptop" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let laptop_id = laptop["data"]["id"].as_i64().unwrap();

    let (status, asset) = send(
        &app,
        "POST",
        "/assets",
        admin,
        Some(json!({
            "inventory_code": "AST-001",
            "category_id": laptop_id,
            "employee_id": ana_id,
            "brand": "Dell",
            "model": "Latitude 5440",
            "serial_number": "DL5440-0001",
            "specifications": { "ram": "16GB", "storage": "512GB SSD" }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let asset_id = asset["data"]["id"].as_i64().unwrap();

    // 部署の責任者は参照できるが、登録はできない
    let (status, body) = send(
        &app,
        "GET",
        "/assets?search=AST-001",
        Some(&tokens.department_head),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["employee"]["department"]["name"], "Finance");

    let (status, body) = send(
        &app,
        "GET",
        &format!("/assets?department_id={}", finance_id),
        Some(&tokens.department_head),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    // 部署とカテゴリの絞り込みは両方を満たす資産だけを返す
    let (status, body) = send(
        &app,
        "GET",
        &format!("/assets?department_id={}&category_id={}", finance_id, laptop_id),
        Some(&tokens.department_head),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["inventory_code"], "AST-001");

    for (department_id, category_id) in [
        (finance_id, laptop_id + 1000),
        (finance_id + 1000, laptop_id),
    ] {
        let (status, body) = send(
            &app,
            "GET",
            &format!("/assets?department_id={}&category_id={}", department_id, category_id),
            Some(&tokens.department_head),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(
            body.as_array().unwrap().is_empty(),
            "department {} / category {} matched {}",
            department_id,
            category_id,
            body
        );
    }

    // 有効な資産を持つ従業員・その部署・カテゴリは削除できない
    let (status, _) = send(&app, "DELETE", &format!("/employees/{}", ana_id), admin, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = send(&app, "DELETE", &format!("/departments/{}", finance_id), admin, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = send(&app, "DELETE", &format!("/categories/{}", laptop_id), admin, None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/assets/{}", asset_id),
        admin,
        Some(json!({ "status": "retired", "comments": "End of lease" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "DELETE", &format!("/assets/{}", asset_id), admin, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "DELETE", &format!("/employees/{}", ana_id), admin, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "DELETE", &format!("/departments/{}", finance_id), admin, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "DELETE", &format!("/categories/{}", laptop_id), admin, None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, summary) = send(&app, "GET", "/dashboard/summary", Some(&tokens.auditor), None).await;
    assert_eq!(summary["total_assets"], 0);
    assert_eq!(summary["total_employees"], 0);
    assert_eq!(summary["total_departments"], 0);

    let logs = audit_logs(&app, &tokens.admin).await;
    let trail: Vec<(String, String)> = logs
        .iter()
        .rev()
        .map(|l| {
            (
                l["action"].as_str().unwrap().to_string(),
                l["table_name"].as_str().unwrap().to_string(),
            )
        })
        .collect();
    let expected = [
        ("CREATE", "departments"),
        ("CREATE", "employees"),
        ("CREATE", "categories"),
        ("CREATE", "assets"),
        ("UPDATE", "assets"),
        ("DELETE", "assets"),
        ("DELETE", "employees"),
        ("DELETE", "departments"),
        ("DELETE", "categories"),
    ];
    assert_eq!(
        trail,
        expected
            .iter()
            .map(|(a, t)| (a.to_string(), t.to_string()))
            .collect::<Vec<_>>()
    );
    assert_eq!(
        logs[4]["description"],
        "Updated asset AST-001. Status changed: operational -> retired."
    );
    assert!(logs.iter().all(|l| l["user"]["email"] == "admin@example.com"));
}

#[tokio::test]
async fn test_department_head_reads_but_cannot_write() {
    let (app, pool) = create_test_app().await;
    let tokens = seed_role_tokens(&app, &pool).await;

    let (status, body) = send(
        &app,
        "POST",
        "/categories",
        Some(&tokens.department_head),
        Some(json!({ "name": "Tablet" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Forbidden");

    let (status, body) = send(&app, "GET", "/categories", Some(&tokens.department_head), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());

    let (status, _) = send(&app, "GET", "/audit-logs", Some(&tokens.department_head), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(audit_logs(&app, &tokens.admin).await.is_empty());
}
