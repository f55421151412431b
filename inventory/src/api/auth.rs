//! 認証API
//!
//! ログイン、ログアウト、トークン更新、認証情報確認

use crate::api::error::{ApiResult, AppError};
use crate::api::extract::ApiJson;
use crate::api::MessageResponse;
use crate::auth::jwt::{create_jwt, JWT_EXPIRATION_SECS};
use crate::auth::password::{hash_password, verify_password};
use crate::common::auth::{AuthUser, UserProfile};
use crate::common::error::{FieldErrors, InventoryError};
use crate::common::validation::required_string;
use crate::db;
use crate::AppState;
use axum::{extract::State, Extension, Json};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// トークン種別
const TOKEN_TYPE: &str = "bearer";

/// 未登録メールアドレスでのログイン時に照合するハッシュ
///
/// 照合コストは登録済みユーザーのパスワード照合と同じになる。
static DUMMY_PASSWORD_HASH: Lazy<Option<String>> =
    Lazy::new(|| hash_password("not-a-registered-account").ok());

/// ログインリクエスト
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// メールアドレス
    pub email: Option<String>,
    /// パスワード
    pub password: Option<String>,
}

/// 発行したトークン
#[derive(Debug, Serialize)]
pub struct Authorization {
    /// JWT
    pub token: String,
    /// トークン種別（常に"bearer"）
    #[serde(rename = "type")]
    pub token_type: &'static str,
    /// 有効期限（秒）
    pub expires_in: i64,
}

/// ログインレスポンス
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// 結果メッセージ
    pub message: String,
    /// ユーザー情報
    pub user: UserProfile,
    /// 発行したトークン
    pub authorization: Authorization,
}

/// トークン更新レスポンス
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// 新しいJWT
    pub new_access_token: String,
    /// トークン種別
    pub token_type: &'static str,
    /// 有効期限（秒）
    pub expires_in: i64,
}

/// POST /login - ログイン
///
/// メールアドレスとパスワードで認証し、JWTトークンを発行
///
/// # Returns
/// * `200 OK` - ログイン成功（ユーザー情報とトークン）
/// * `401 Unauthorized` - メールアドレスまたはパスワードの誤り
/// * `403 Forbidden` - 無効化されたアカウント
/// * `422 Unprocessable Entity` - 必須項目の欠落
pub async fn login(
    State(app_state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let mut errors = FieldErrors::new();
    let email = required_string(&mut errors, "email", request.email.as_deref(), None);
    let password = match request.password.as_deref() {
        Some(p) if !p.is_empty() => Some(p),
        _ => {
            errors.add("password", "The password field is required.");
            None
        }
    };
    errors.into_result()?;
    let email = email.unwrap_or_default();
    let password = password.unwrap_or_default();

    let user = match db::users::find_by_email(&app_state.db_pool, &email).await? {
        Some(user) => user,
        None => {
            if let Some(hash) = DUMMY_PASSWORD_HASH.as_deref() {
                let _ = verify_password(password, hash);
            }
            tracing::warn!(email = %email, "Login failed: unknown email");
            return Err(InventoryError::InvalidCredentials.into());
        }
    };

    if !verify_password(password, &user.password_hash)? {
        tracing::warn!(user_id = user.id, "Login failed: wrong password");
        return Err(InventoryError::InvalidCredentials.into());
    }

    if !user.is_active {
        tracing::warn!(user_id = user.id, "Login refused: account inactive");
        return Err(InventoryError::AccountInactive.into());
    }

    let Some(role) = user.role else {
        tracing::warn!(user_id = user.id, role = %user.raw_role, "Login refused: unknown role");
        return Err(InventoryError::Authorization("Your role is not recognized".to_string()).into());
    };

    let token = create_jwt(user.id, role, &app_state.jwt_secret)?;
    tracing::info!(user_id = user.id, role = %role, "User logged in");

    Ok(Json(LoginResponse {
        message: "User successfully logged in".to_string(),
        user: UserProfile::from(user),
        authorization: Authorization {
            token,
            token_type: TOKEN_TYPE,
            expires_in: JWT_EXPIRATION_SECS,
        },
    }))
}

/// POST /logout - ログアウト
///
/// トークンはサーバー側に保持しないため、クライアントが破棄する。
pub async fn logout(Extension(auth_user): Extension<AuthUser>) -> Json<MessageResponse> {
    tracing::info!(user_id = auth_user.id, "User logged out");
    Json(MessageResponse::new("Successfully logged out"))
}

/// POST /refresh - トークン更新
///
/// 現在のユーザーに新しいトークンを発行する。ロールは保存値から取り直す。
pub async fn refresh(
    Extension(auth_user): Extension<AuthUser>,
    State(app_state): State<AppState>,
) -> ApiResult<Json<RefreshResponse>> {
    let token = create_jwt(auth_user.id, auth_user.role, &app_state.jwt_secret)?;
    Ok(Json(RefreshResponse {
        new_access_token: token,
        token_type: TOKEN_TYPE,
        expires_in: JWT_EXPIRATION_SECS,
    }))
}

/// GET /me - 認証中のユーザー情報
///
/// # Returns
/// * `200 OK` - ユーザー情報
/// * `401 Unauthorized` - 未認証
pub async fn me(
    Extension(auth_user): Extension<AuthUser>,
    State(app_state): State<AppState>,
) -> ApiResult<Json<UserProfile>> {
    let user = db::users::find_by_id(&app_state.db_pool, auth_user.id)
        .await?
        .ok_or_else(|| {
            AppError(InventoryError::Authentication(
                "User no longer exists".to_string(),
            ))
        })?;
    Ok(Json(UserProfile::from(user)))
}
