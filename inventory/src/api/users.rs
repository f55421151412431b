//! ユーザー管理API
//!
//! Admin専用のユーザーCRUD操作。レスポンスにパスワードハッシュは含めない。

use crate::api::error::ApiResult;
use crate::api::extract::ApiJson;
use crate::api::{begin, commit, DataResponse, MessageResponse};
use crate::audit::{recorder, types::NewAuditEntry};
use crate::auth::password::hash_password;
use crate::common::auth::{AuthUser, UserProfile, UserRole};
use crate::common::error::{FieldErrors, InventoryError};
use crate::common::validation::{
    already_taken, enum_value, min_length, required_email, required_string,
};
use crate::db;
use crate::db::users::UserChanges;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;

const TABLE: &str = "users";
const NAME_MAX: usize = 255;
const EMAIL_MAX: usize = 255;
const PASSWORD_MIN: usize = 6;

/// ユーザー作成リクエスト
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    /// 表示名
    pub name: Option<String>,
    /// メールアドレス
    pub email: Option<String>,
    /// パスワード
    pub password: Option<String>,
    /// ロール
    pub role: Option<String>,
    /// 有効フラグ（省略時は有効）
    pub is_active: Option<bool>,
}

/// ユーザー更新リクエスト
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    /// 表示名
    pub name: Option<String>,
    /// メールアドレス
    pub email: Option<String>,
    /// ロール
    pub role: Option<String>,
    /// 有効フラグ（オプション）
    pub is_active: Option<bool>,
    /// 新しいパスワード（空なら変更しない）
    pub password: Option<String>,
}

/// 名前・メール・ロールを検証する（作成・更新で共通）
async fn validate_identity(
    app_state: &AppState,
    errors: &mut FieldErrors,
    name: Option<&str>,
    email: Option<&str>,
    role: Option<&str>,
    exclude_id: Option<i64>,
) -> Result<(String, String, Option<UserRole>), InventoryError> {
    let name = required_string(errors, "name", name, Some(NAME_MAX));
    let email = required_email(errors, "email", email, Some(EMAIL_MAX));
    let role = enum_value(errors, "role", role, true, UserRole::parse);
    if let Some(email) = email.as_deref() {
        if db::users::email_taken(&app_state.db_pool, email, exclude_id).await? {
            already_taken(errors, "email");
        }
    }
    Ok((name.unwrap_or_default(), email.unwrap_or_default(), role))
}

fn not_found(id: i64) -> InventoryError {
    InventoryError::NotFound(format!("User {} not found", id))
}

/// GET /users - ユーザー一覧
///
/// 呼び出したAdmin自身は含めない（ID順）
///
/// # Returns
/// * `200 OK` - ユーザー一覧
/// * `403 Forbidden` - Admin権限なし
pub async fn list_users(
    Extension(auth_user): Extension<AuthUser>,
    State(app_state): State<AppState>,
) -> ApiResult<Json<Vec<UserProfile>>> {
    let users = db::users::list_excluding(&app_state.db_pool, auth_user.id).await?;
    Ok(Json(users.into_iter().map(UserProfile::from).collect()))
}

/// GET /users/{id} - ユーザー参照
pub async fn get_user(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<UserProfile>> {
    let user = db::users::find_by_id(&app_state.db_pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(UserProfile::from(user)))
}

/// POST /users - ユーザー作成
///
/// # Returns
/// * `201 Created` - 作成されたユーザー
/// * `422 Unprocessable Entity` - 検証エラー（メール重複、短いパスワードなど）
pub async fn create_user(
    Extension(auth_user): Extension<AuthUser>,
    State(app_state): State<AppState>,
    ApiJson(request): ApiJson<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<DataResponse<UserProfile>>)> {
    let mut errors = FieldErrors::new();
    let (name, email, role) = validate_identity(
        &app_state,
        &mut errors,
        request.name.as_deref(),
        request.email.as_deref(),
        request.role.as_deref(),
        None,
    )
    .await?;
    let password = request.password.unwrap_or_default();
    if password.is_empty() {
        errors.add("password", "The password field is required.");
    } else {
        min_length(&mut errors, "password", &password, PASSWORD_MIN);
    }
    errors.into_result()?;
    let Some(role) = role else {
        return Err(InventoryError::Internal("role missing after validation".to_string()).into());
    };

    let password_hash = hash_password(&password)?;

    let mut tx = begin(&app_state.db_pool).await?;
    let mut user = db::users::create(&mut tx, &name, &email, &password_hash, role).await?;
    if request.is_active == Some(false) {
        user = db::users::update(
            &mut tx,
            user.id,
            &UserChanges {
                name: user.name.clone(),
                email: user.email.clone(),
                role,
                is_active: Some(false),
                password_hash: None,
            },
        )
        .await?;
    }
    recorder::record(
        &mut tx,
        &auth_user,
        NewAuditEntry::create(
            TABLE,
            user.id,
            format!("Created user: {} ({})", user.email, role),
        ),
    )
    .await?;
    commit(tx).await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(
            "User created successfully",
            UserProfile::from(user),
        )),
    ))
}

/// PUT /users/{id} - ユーザー更新
///
/// パスワードは空でない値が指定された場合のみ再ハッシュする
///
/// # Returns
/// * `200 OK` - 更新後のユーザー
/// * `404 Not Found` - 存在しない
/// * `422 Unprocessable Entity` - 検証エラー
pub async fn update_user(
    Extension(auth_user): Extension<AuthUser>,
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(request): ApiJson<UpdateUserRequest>,
) -> ApiResult<Json<DataResponse<UserProfile>>> {
    db::users::find_by_id(&app_state.db_pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let mut errors = FieldErrors::new();
    let (name, email, role) = validate_identity(
        &app_state,
        &mut errors,
        request.name.as_deref(),
        request.email.as_deref(),
        request.role.as_deref(),
        Some(id),
    )
    .await?;
    let new_password = request.password.filter(|p| !p.is_empty());
    if let Some(password) = new_password.as_deref() {
        min_length(&mut errors, "password", password, PASSWORD_MIN);
    }
    errors.into_result()?;
    let Some(role) = role else {
        return Err(InventoryError::Internal("role missing after validation".to_string()).into());
    };

    let password_hash = new_password.as_deref().map(hash_password).transpose()?;
    let password_reset = password_hash.is_some();

    let mut tx = begin(&app_state.db_pool).await?;
    let user = db::users::update(
        &mut tx,
        id,
        &UserChanges {
            name,
            email,
            role,
            is_active: request.is_active,
            password_hash,
        },
    )
    .await?;
    let mut description = format!("Updated user: {}", user.email);
    if password_reset {
        description.push_str(" Password reset.");
    }
    recorder::record(&mut tx, &auth_user, NewAuditEntry::update(TABLE, id, description)).await?;
    commit(tx).await?;

    Ok(Json(DataResponse::new(
        "User updated successfully",
        UserProfile::from(user),
    )))
}

/// DELETE /users/{id} - ユーザー削除
///
/// 削除したユーザーの監査ログはそのまま残る
pub async fn delete_user(
    Extension(auth_user): Extension<AuthUser>,
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    let mut tx = begin(&app_state.db_pool).await?;
    let user = db::users::find_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    db::users::delete(&mut tx, id).await?;
    recorder::record(
        &mut tx,
        &auth_user,
        NewAuditEntry::delete(TABLE, id, format!("Deleted user: {}", user.email)),
    )
    .await?;
    commit(tx).await?;

    Ok(Json(MessageResponse::new("User deleted successfully")))
}
