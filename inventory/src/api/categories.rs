//! カテゴリAPI

use crate::api::error::ApiResult;
use crate::api::extract::ApiJson;
use crate::api::{begin, commit, DataResponse, ListQuery, MessageResponse};
use crate::audit::{recorder, types::NewAuditEntry};
use crate::common::auth::AuthUser;
use crate::common::error::{FieldErrors, InventoryError};
use crate::common::validation::{already_taken, required_string};
use crate::db;
use crate::db::integrity::{ensure_deletable, DeleteTarget};
use crate::types::Category;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;

const TABLE: &str = "categories";
const NAME_MAX: usize = 50;

/// カテゴリの作成・更新リクエスト
#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    /// カテゴリ名
    pub name: Option<String>,
}

async fn validate_name(
    app_state: &AppState,
    request: &CategoryRequest,
    exclude_id: Option<i64>,
) -> Result<String, InventoryError> {
    let mut errors = FieldErrors::new();
    let name = required_string(&mut errors, "name", request.name.as_deref(), Some(NAME_MAX));
    if let Some(name) = name.as_deref() {
        if db::categories::name_taken(&app_state.db_pool, name, exclude_id).await? {
            already_taken(&mut errors, "name");
        }
    }
    errors.into_result()?;
    Ok(name.unwrap_or_default())
}

fn not_found(id: i64) -> InventoryError {
    InventoryError::NotFound(format!("Category {} not found", id))
}

/// GET /categories - カテゴリ一覧（名前順）
pub async fn list_categories(
    State(app_state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Category>>> {
    let categories = db::categories::list(&app_state.db_pool, query.search().as_deref()).await?;
    Ok(Json(categories))
}

/// GET /categories/{id} - カテゴリ参照
pub async fn get_category(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Category>> {
    let category = db::categories::find_by_id(&app_state.db_pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(category))
}

/// POST /categories - カテゴリ作成
pub async fn create_category(
    Extension(auth_user): Extension<AuthUser>,
    State(app_state): State<AppState>,
    ApiJson(request): ApiJson<CategoryRequest>,
) -> ApiResult<(StatusCode, Json<DataResponse<Category>>)> {
    let name = validate_name(&app_state, &request, None).await?;

    let mut tx = begin(&app_state.db_pool).await?;
    let category = db::categories::insert(&mut tx, &name).await?;
    recorder::record(
        &mut tx,
        &auth_user,
        NewAuditEntry::create(
            TABLE,
            category.id,
            format!("Created category: {}", category.name),
        ),
    )
    .await?;
    commit(tx).await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new("Category created successfully", category)),
    ))
}

/// PUT /categories/{id} - カテゴリ名の変更
pub async fn update_category(
    Extension(auth_user): Extension<AuthUser>,
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(request): ApiJson<CategoryRequest>,
) -> ApiResult<Json<DataResponse<Category>>> {
    let existing = db::categories::find_by_id(&app_state.db_pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let name = validate_name(&app_state, &request, Some(id)).await?;

    let mut tx = begin(&app_state.db_pool).await?;
    let category = db::categories::rename(&mut tx, id, &name).await?;
    recorder::record(
        &mut tx,
        &auth_user,
        NewAuditEntry::update(
            TABLE,
            id,
            format!("Renamed category: '{}' -> '{}'", existing.name, category.name),
        ),
    )
    .await?;
    commit(tx).await?;

    Ok(Json(DataResponse::new("Category updated successfully", category)))
}

/// DELETE /categories/{id} - カテゴリ削除
///
/// 有効な資産が登録されている間は409を返す
pub async fn delete_category(
    Extension(auth_user): Extension<AuthUser>,
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    let mut tx = begin(&app_state.db_pool).await?;
    let category = db::categories::find_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    ensure_deletable(&mut tx, DeleteTarget::Category(id)).await?;
    db::categories::delete(&mut tx, id).await?;
    recorder::record(
        &mut tx,
        &auth_user,
        NewAuditEntry::delete(TABLE, id, format!("Deleted category: {}", category.name)),
    )
    .await?;
    commit(tx).await?;

    Ok(Json(MessageResponse::new("Category deleted successfully")))
}
