//! 部署API
//!
//! 一覧・参照は全ロール、作成・更新・削除はAdminのみ（許可テーブルで判定済み）

use crate::api::error::ApiResult;
use crate::api::extract::ApiJson;
use crate::api::{begin, commit, DataResponse, ListQuery, MessageResponse};
use crate::audit::{recorder, types::NewAuditEntry};
use crate::common::auth::AuthUser;
use crate::common::error::{FieldErrors, InventoryError};
use crate::common::validation::{already_taken, optional_string, required_string};
use crate::db;
use crate::db::integrity::{ensure_deletable, DeleteTarget};
use crate::types::Department;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;

const TABLE: &str = "departments";
const NAME_MAX: usize = 255;

/// 部署の作成・更新リクエスト（更新も全項目置き換え）
#[derive(Debug, Deserialize)]
pub struct DepartmentRequest {
    /// 部署名
    pub name: Option<String>,
    /// 説明
    pub description: Option<String>,
}

struct ValidDepartment {
    name: String,
    description: Option<String>,
}

async fn validate(
    app_state: &AppState,
    request: &DepartmentRequest,
    exclude_id: Option<i64>,
) -> Result<ValidDepartment, InventoryError> {
    let mut errors = FieldErrors::new();
    let name = required_string(&mut errors, "name", request.name.as_deref(), Some(NAME_MAX));
    let description = optional_string(&mut errors, "description", request.description.as_deref(), None);
    if let Some(name) = name.as_deref() {
        if db::departments::name_taken(&app_state.db_pool, name, exclude_id).await? {
            already_taken(&mut errors, "name");
        }
    }
    errors.into_result()?;
    Ok(ValidDepartment {
        name: name.unwrap_or_default(),
        description,
    })
}

fn not_found(id: i64) -> InventoryError {
    InventoryError::NotFound(format!("Department {} not found", id))
}

/// GET /departments - 部署一覧（名前順）
///
/// `search`で名前・説明を部分一致検索
pub async fn list_departments(
    State(app_state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Department>>> {
    let departments = db::departments::list(&app_state.db_pool, query.search().as_deref()).await?;
    Ok(Json(departments))
}

/// GET /departments/{id} - 部署参照
///
/// # Returns
/// * `200 OK` - 部署
/// * `404 Not Found` - 存在しない
pub async fn get_department(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Department>> {
    let department = db::departments::find_by_id(&app_state.db_pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(department))
}

/// POST /departments - 部署作成
///
/// # Returns
/// * `201 Created` - 作成された部署
/// * `422 Unprocessable Entity` - 検証エラー（名前の欠落・重複など）
pub async fn create_department(
    Extension(auth_user): Extension<AuthUser>,
    State(app_state): State<AppState>,
    ApiJson(request): ApiJson<DepartmentRequest>,
) -> ApiResult<(StatusCode, Json<DataResponse<Department>>)> {
    let input = validate(&app_state, &request, None).await?;

    let mut tx = begin(&app_state.db_pool).await?;
    let department =
        db::departments::insert(&mut tx, &input.name, input.description.as_deref()).await?;
    recorder::record(
        &mut tx,
        &auth_user,
        NewAuditEntry::create(
            TABLE,
            department.id,
            format!("Created department: {}", department.name),
        ),
    )
    .await?;
    commit(tx).await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new("Department created successfully", department)),
    ))
}

/// PUT /departments/{id} - 部署更新
///
/// # Returns
/// * `200 OK` - 更新後の部署
/// * `404 Not Found` - 存在しない
/// * `422 Unprocessable Entity` - 検証エラー
pub async fn update_department(
    Extension(auth_user): Extension<AuthUser>,
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(request): ApiJson<DepartmentRequest>,
) -> ApiResult<Json<DataResponse<Department>>> {
    let existing = db::departments::find_by_id(&app_state.db_pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let input = validate(&app_state, &request, Some(id)).await?;

    let mut tx = begin(&app_state.db_pool).await?;
    let department =
        db::departments::update(&mut tx, id, &input.name, input.description.as_deref()).await?;
    recorder::record(
        &mut tx,
        &auth_user,
        NewAuditEntry::update(
            TABLE,
            id,
            format!(
                "Updated department: '{}' -> '{}'",
                existing.name, department.name
            ),
        ),
    )
    .await?;
    commit(tx).await?;

    Ok(Json(DataResponse::new(
        "Department updated successfully",
        department,
    )))
}

/// DELETE /departments/{id} - 部署削除
///
/// # Returns
/// * `200 OK` - 削除成功
/// * `404 Not Found` - 存在しない
/// * `409 Conflict` - 所属従業員がいる
pub async fn delete_department(
    Extension(auth_user): Extension<AuthUser>,
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    let mut tx = begin(&app_state.db_pool).await?;
    let department = db::departments::find_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    ensure_deletable(&mut tx, DeleteTarget::Department(id)).await?;
    db::departments::delete(&mut tx, id).await?;
    recorder::record(
        &mut tx,
        &auth_user,
        NewAuditEntry::delete(
            TABLE,
            id,
            format!("Deleted department: '{}'", department.name),
        ),
    )
    .await?;
    commit(tx).await?;

    Ok(Json(MessageResponse::new("Department deleted successfully")))
}
