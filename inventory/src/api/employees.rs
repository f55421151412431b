//! 従業員API

use crate::api::error::ApiResult;
use crate::api::extract::ApiJson;
use crate::api::{begin, commit, DataResponse, ListQuery, MessageResponse};
use crate::audit::{recorder, types::NewAuditEntry};
use crate::common::auth::AuthUser;
use crate::common::error::{FieldErrors, InventoryError};
use crate::common::validation::{
    already_taken, enum_value, invalid_reference, optional_email, required_id, required_string,
};
use crate::db;
use crate::db::employees::{EmployeeFilter, EmployeeInput};
use crate::db::integrity::{ensure_deletable, DeleteTarget};
use crate::types::{Employee, EmployeeDetails, EmployeeStatus};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;

const TABLE: &str = "employees";
const NAME_MAX: usize = 100;
const EMAIL_MAX: usize = 255;

/// 従業員の作成・更新リクエスト（更新も全項目置き換え）
#[derive(Debug, Deserialize)]
pub struct EmployeeRequest {
    /// 名
    pub first_name: Option<String>,
    /// 姓
    pub last_name: Option<String>,
    /// メールアドレス（任意）
    pub email: Option<String>,
    /// 所属部署ID
    pub department_id: Option<i64>,
    /// 在籍状態（省略時は作成なら"active"、更新なら現在値）
    pub status: Option<String>,
}

async fn validate(
    app_state: &AppState,
    request: &EmployeeRequest,
    existing: Option<&Employee>,
) -> Result<EmployeeInput, InventoryError> {
    let mut errors = FieldErrors::new();
    let first_name = required_string(
        &mut errors,
        "first_name",
        request.first_name.as_deref(),
        Some(NAME_MAX),
    );
    let last_name = required_string(
        &mut errors,
        "last_name",
        request.last_name.as_deref(),
        Some(NAME_MAX),
    );
    let email = optional_email(&mut errors, "email", request.email.as_deref(), Some(EMAIL_MAX));
    let department_id = required_id(&mut errors, "department_id", request.department_id);
    let status = enum_value(
        &mut errors,
        "status",
        request.status.as_deref(),
        false,
        EmployeeStatus::parse,
    );

    if let Some(email) = email.as_deref() {
        if db::employees::email_taken(&app_state.db_pool, email, existing.map(|e| e.id)).await? {
            already_taken(&mut errors, "email");
        }
    }
    if let Some(department_id) = department_id {
        if !db::departments::exists(&app_state.db_pool, department_id).await? {
            invalid_reference(&mut errors, "department_id");
        }
    }
    errors.into_result()?;

    Ok(EmployeeInput {
        first_name: first_name.unwrap_or_default(),
        last_name: last_name.unwrap_or_default(),
        email,
        department_id: department_id.unwrap_or_default(),
        status: status
            .or_else(|| existing.map(|e| e.status))
            .unwrap_or_default(),
    })
}

fn not_found(id: i64) -> InventoryError {
    InventoryError::NotFound(format!("Employee {} not found", id))
}

/// GET /employees - 従業員一覧（姓・名の順、所属部署付き）
///
/// `department_id`で部署を絞り込み、`search`で名・姓・メールを部分一致検索
pub async fn list_employees(
    State(app_state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<EmployeeDetails>>> {
    let (department_id, _) = query.ids()?;
    let filter = EmployeeFilter {
        search: query.search(),
        department_id,
    };
    let employees = db::employees::list(&app_state.db_pool, &filter).await?;
    Ok(Json(employees))
}

/// GET /employees/{id} - 従業員参照（所属部署と割り当て資産付き）
///
/// # Returns
/// * `200 OK` - 従業員
/// * `404 Not Found` - 存在しない
pub async fn get_employee(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<EmployeeDetails>> {
    let employee = db::employees::find_details(&app_state.db_pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(employee))
}

/// POST /employees - 従業員登録
///
/// # Returns
/// * `201 Created` - 登録された従業員
/// * `422 Unprocessable Entity` - 検証エラー（部署が存在しない、メール重複など）
pub async fn create_employee(
    Extension(auth_user): Extension<AuthUser>,
    State(app_state): State<AppState>,
    ApiJson(request): ApiJson<EmployeeRequest>,
) -> ApiResult<(StatusCode, Json<DataResponse<Employee>>)> {
    let input = validate(&app_state, &request, None).await?;

    let mut tx = begin(&app_state.db_pool).await?;
    let employee = db::employees::insert(&mut tx, &input).await?;
    recorder::record(
        &mut tx,
        &auth_user,
        NewAuditEntry::create(
            TABLE,
            employee.id,
            format!("Created employee: {}", employee.full_name()),
        ),
    )
    .await?;
    commit(tx).await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new("Employee created successfully", employee)),
    ))
}

/// PUT /employees/{id} - 従業員更新
///
/// # Returns
/// * `200 OK` - 更新後の従業員
/// * `404 Not Found` - 存在しない
/// * `422 Unprocessable Entity` - 検証エラー
pub async fn update_employee(
    Extension(auth_user): Extension<AuthUser>,
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(request): ApiJson<EmployeeRequest>,
) -> ApiResult<Json<DataResponse<Employee>>> {
    let existing = db::employees::find_by_id(&app_state.db_pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let input = validate(&app_state, &request, Some(&existing)).await?;

    let mut tx = begin(&app_state.db_pool).await?;
    let employee = db::employees::update(&mut tx, id, &input).await?;
    recorder::record(
        &mut tx,
        &auth_user,
        NewAuditEntry::update(
            TABLE,
            id,
            format!("Updated employee: {}", employee.full_name()),
        ),
    )
    .await?;
    commit(tx).await?;

    Ok(Json(DataResponse::new("Employee updated successfully", employee)))
}

/// DELETE /employees/{id} - 従業員削除
///
/// # Returns
/// * `200 OK` - 削除成功
/// * `404 Not Found` - 存在しない
/// * `409 Conflict` - 有効な資産が割り当てられている
pub async fn delete_employee(
    Extension(auth_user): Extension<AuthUser>,
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    let mut tx = begin(&app_state.db_pool).await?;
    let employee = db::employees::find_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    ensure_deletable(&mut tx, DeleteTarget::Employee(id)).await?;
    db::employees::delete(&mut tx, id).await?;
    recorder::record(
        &mut tx,
        &auth_user,
        NewAuditEntry::delete(
            TABLE,
            id,
            format!("Deleted employee: {}", employee.full_name()),
        ),
    )
    .await?;
    commit(tx).await?;

    Ok(Json(MessageResponse::new("Employee deleted successfully")))
}
