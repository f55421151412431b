//! 資産API
//!
//! 削除は論理削除のみ。論理削除済みの資産は一覧・参照・更新の対象外となる。

use crate::api::error::ApiResult;
use crate::api::extract::ApiJson;
use crate::api::{begin, commit, double_option, DataResponse, ListQuery, MessageResponse};
use crate::audit::{recorder, types::NewAuditEntry};
use crate::common::auth::AuthUser;
use crate::common::error::{FieldErrors, InventoryError};
use crate::common::validation::{
    already_taken, enum_value, invalid_reference, optional_string, required_id, required_string,
};
use crate::db;
use crate::db::assets::{AssetFilter, AssetInput};
use crate::types::{Asset, AssetDetails, AssetStatus, Specifications};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use sqlx::SqliteConnection;

const TABLE: &str = "assets";
const CODE_MAX: usize = 255;

/// 資産登録リクエスト
#[derive(Debug, Deserialize)]
pub struct CreateAssetRequest {
    /// 資産管理番号
    pub inventory_code: Option<String>,
    /// カテゴリID
    pub category_id: Option<i64>,
    /// 担当者ID
    pub employee_id: Option<i64>,
    /// メーカー
    pub brand: Option<String>,
    /// 型番
    pub model: Option<String>,
    /// シリアル番号
    pub serial_number: Option<String>,
    /// ステータス（省略時は"operational"）
    pub status: Option<String>,
    /// 仕様（文字列→文字列）
    pub specifications: Option<Specifications>,
    /// 備考
    pub comments: Option<String>,
}

/// 資産更新リクエスト
///
/// 指定したフィールドのみ変更する。`serial_number`・`comments`・`specifications`は
/// `null`を指定すると空にできる。
#[derive(Debug, Default, Deserialize)]
pub struct UpdateAssetRequest {
    /// 資産管理番号
    pub inventory_code: Option<String>,
    /// カテゴリID
    pub category_id: Option<i64>,
    /// 担当者ID
    pub employee_id: Option<i64>,
    /// メーカー
    pub brand: Option<String>,
    /// 型番
    pub model: Option<String>,
    /// シリアル番号
    #[serde(default, deserialize_with = "double_option")]
    pub serial_number: Option<Option<String>>,
    /// ステータス
    pub status: Option<String>,
    /// 仕様
    #[serde(default, deserialize_with = "double_option")]
    pub specifications: Option<Option<Specifications>>,
    /// 備考
    #[serde(default, deserialize_with = "double_option")]
    pub comments: Option<Option<String>>,
}

/// 参照先・一意性のDB検証
async fn check_references(
    conn: &mut SqliteConnection,
    errors: &mut FieldErrors,
    input: &AssetInput,
    exclude_id: Option<i64>,
) -> Result<(), InventoryError> {
    if !errors.has("inventory_code")
        && db::assets::inventory_code_taken(&mut *conn, &input.inventory_code, exclude_id).await?
    {
        already_taken(errors, "inventory_code");
    }
    if let Some(serial_number) = input.serial_number.as_deref() {
        if !errors.has("serial_number")
            && db::assets::serial_number_taken(&mut *conn, serial_number, exclude_id).await?
        {
            already_taken(errors, "serial_number");
        }
    }
    if !errors.has("category_id")
        && !db::categories::exists(&mut *conn, input.category_id).await?
    {
        invalid_reference(errors, "category_id");
    }
    if !errors.has("employee_id")
        && !db::employees::exists(&mut *conn, input.employee_id).await?
    {
        invalid_reference(errors, "employee_id");
    }
    Ok(())
}

async fn validate_create(
    conn: &mut SqliteConnection,
    request: CreateAssetRequest,
) -> Result<AssetInput, InventoryError> {
    let mut errors = FieldErrors::new();
    let inventory_code = required_string(
        &mut errors,
        "inventory_code",
        request.inventory_code.as_deref(),
        Some(CODE_MAX),
    );
    let category_id = required_id(&mut errors, "category_id", request.category_id);
    let employee_id = required_id(&mut errors, "employee_id", request.employee_id);
    let brand = required_string(&mut errors, "brand", request.brand.as_deref(), Some(CODE_MAX));
    let model = required_string(&mut errors, "model", request.model.as_deref(), Some(CODE_MAX));
    let serial_number = optional_string(
        &mut errors,
        "serial_number",
        request.serial_number.as_deref(),
        Some(CODE_MAX),
    );
    let status = enum_value(
        &mut errors,
        "status",
        request.status.as_deref(),
        false,
        AssetStatus::parse,
    );
    let comments = optional_string(&mut errors, "comments", request.comments.as_deref(), None);

    let input = AssetInput {
        inventory_code: inventory_code.unwrap_or_default(),
        category_id: category_id.unwrap_or_default(),
        employee_id: employee_id.unwrap_or_default(),
        brand: brand.unwrap_or_default(),
        model: model.unwrap_or_default(),
        serial_number,
        status: status.unwrap_or_default(),
        specifications: request.specifications.unwrap_or_default(),
        comments,
    };
    check_references(conn, &mut errors, &input, None).await?;
    errors.into_result()?;
    Ok(input)
}

/// 既存の資産にリクエストの指定分を重ねて検証する
async fn validate_update(
    conn: &mut SqliteConnection,
    existing: &Asset,
    request: UpdateAssetRequest,
) -> Result<AssetInput, InventoryError> {
    let mut errors = FieldErrors::new();

    let inventory_code = match request.inventory_code.as_deref() {
        Some(value) => required_string(&mut errors, "inventory_code", Some(value), Some(CODE_MAX)),
        None => Some(existing.inventory_code.clone()),
    };
    let brand = match request.brand.as_deref() {
        Some(value) => required_string(&mut errors, "brand", Some(value), Some(CODE_MAX)),
        None => Some(existing.brand.clone()),
    };
    let model = match request.model.as_deref() {
        Some(value) => required_string(&mut errors, "model", Some(value), Some(CODE_MAX)),
        None => Some(existing.model.clone()),
    };
    let category_id = required_id(
        &mut errors,
        "category_id",
        request.category_id.or(existing.category_id),
    );
    let employee_id = required_id(
        &mut errors,
        "employee_id",
        request.employee_id.or(existing.employee_id),
    );
    let serial_number = match request.serial_number {
        Some(value) => optional_string(
            &mut errors,
            "serial_number",
            value.as_deref(),
            Some(CODE_MAX),
        ),
        None => existing.serial_number.clone(),
    };
    let status = match request.status.as_deref() {
        Some(value) => enum_value(&mut errors, "status", Some(value), true, AssetStatus::parse),
        None => Some(existing.status),
    };
    let comments = match request.comments {
        Some(value) => optional_string(&mut errors, "comments", value.as_deref(), None),
        None => existing.comments.clone(),
    };
    let specifications = match request.specifications {
        Some(value) => value.unwrap_or_default(),
        None => existing.specifications.clone(),
    };

    let input = AssetInput {
        inventory_code: inventory_code.unwrap_or_default(),
        category_id: category_id.unwrap_or_default(),
        employee_id: employee_id.unwrap_or_default(),
        brand: brand.unwrap_or_default(),
        model: model.unwrap_or_default(),
        serial_number,
        status: status.unwrap_or(existing.status),
        specifications,
        comments,
    };
    check_references(conn, &mut errors, &input, Some(existing.id)).await?;
    errors.into_result()?;
    Ok(input)
}

/// 更新内容の説明文（ステータス変更・担当者変更を含める）
fn update_description(before: &Asset, after: &Asset) -> String {
    let mut description = format!("Updated asset {}.", after.inventory_code);
    if before.status != after.status {
        description.push_str(&format!(
            " Status changed: {} -> {}.",
            before.status, after.status
        ));
    }
    if before.employee_id != after.employee_id {
        description.push_str(&format!(
            " Reassigned from employee ID {} to {}.",
            display_id(before.employee_id),
            display_id(after.employee_id)
        ));
    }
    description
}

fn display_id(id: Option<i64>) -> String {
    id.map_or_else(|| "none".to_string(), |id| id.to_string())
}

fn not_found(id: i64) -> InventoryError {
    InventoryError::NotFound(format!("Asset {} not found", id))
}

/// GET /assets - 資産一覧（登録日時の新しい順、カテゴリ・担当者・部署付き）
///
/// `category_id`・`department_id`（担当者の所属部署）で絞り込み、
/// `search`で管理番号・メーカー・型番・シリアル番号・担当者名を部分一致検索
pub async fn list_assets(
    State(app_state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<AssetDetails>>> {
    let (department_id, category_id) = query.ids()?;
    let filter = AssetFilter {
        search: query.search(),
        category_id,
        department_id,
    };
    let assets = db::assets::list(&app_state.db_pool, &filter).await?;
    Ok(Json(assets))
}

/// GET /assets/{id} - 資産参照
///
/// # Returns
/// * `200 OK` - 資産（関連付き）
/// * `404 Not Found` - 存在しない、または論理削除済み
pub async fn get_asset(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<AssetDetails>> {
    let asset = db::assets::find_details(&app_state.db_pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(asset))
}

/// POST /assets - 資産登録
///
/// # Returns
/// * `201 Created` - 登録された資産
/// * `422 Unprocessable Entity` - 検証エラー
pub async fn create_asset(
    Extension(auth_user): Extension<AuthUser>,
    State(app_state): State<AppState>,
    ApiJson(request): ApiJson<CreateAssetRequest>,
) -> ApiResult<(StatusCode, Json<DataResponse<Asset>>)> {
    let mut tx = begin(&app_state.db_pool).await?;
    let input = validate_create(&mut tx, request).await?;
    let asset = db::assets::insert(&mut tx, &input).await?;
    recorder::record(
        &mut tx,
        &auth_user,
        NewAuditEntry::create(
            TABLE,
            &asset.inventory_code,
            format!(
                "Registered asset: {} {} assigned to employee ID {}",
                asset.brand,
                asset.model,
                display_id(asset.employee_id)
            ),
        ),
    )
    .await?;
    commit(tx).await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new("Asset registered successfully", asset)),
    ))
}

/// PUT /assets/{id} - 資産更新（部分更新）
///
/// # Returns
/// * `200 OK` - 更新後の資産
/// * `404 Not Found` - 存在しない、または論理削除済み
/// * `422 Unprocessable Entity` - 検証エラー
pub async fn update_asset(
    Extension(auth_user): Extension<AuthUser>,
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(request): ApiJson<UpdateAssetRequest>,
) -> ApiResult<Json<DataResponse<Asset>>> {
    let mut tx = begin(&app_state.db_pool).await?;
    let existing = db::assets::find_live(&mut *tx, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let input = validate_update(&mut tx, &existing, request).await?;
    let asset = db::assets::update(&mut tx, id, &input).await?;
    recorder::record(
        &mut tx,
        &auth_user,
        NewAuditEntry::update(
            TABLE,
            &asset.inventory_code,
            update_description(&existing, &asset),
        ),
    )
    .await?;
    commit(tx).await?;

    Ok(Json(DataResponse::new("Asset updated successfully", asset)))
}

/// DELETE /assets/{id} - 資産の論理削除
///
/// # Returns
/// * `200 OK` - 削除成功
/// * `404 Not Found` - 存在しない、または論理削除済み
pub async fn delete_asset(
    Extension(auth_user): Extension<AuthUser>,
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    let mut tx = begin(&app_state.db_pool).await?;
    let asset = db::assets::find_live(&mut *tx, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    db::assets::soft_delete(&mut tx, id).await?;
    recorder::record(
        &mut tx,
        &auth_user,
        NewAuditEntry::delete(
            TABLE,
            &asset.inventory_code,
            format!("Retired asset: {}", asset.inventory_code),
        ),
    )
    .await?;
    commit(tx).await?;

    Ok(Json(MessageResponse::new("Asset deleted successfully")))
}
