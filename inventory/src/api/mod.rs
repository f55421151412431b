//! REST APIハンドラー
//!
//! ルーター構築と、各エンティティのハンドラーが共有するヘルパー

pub mod assets;
pub mod audit_log;
pub mod auth;
pub mod categories;
pub mod dashboard;
pub mod departments;
pub mod employees;
pub mod error;
pub mod extract;
pub mod users;

use crate::auth::middleware::access_control_middleware;
use crate::common::error::{FieldErrors, InventoryError};
use crate::AppState;
use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// アプリケーションのルーターを作成
///
/// `/login`と`/health`以外は全てアクセス制御ミドルウェアを通る。
pub fn create_app(state: AppState) -> Router {
    let protected = Router::new()
        .route("/me", get(auth::me))
        .route("/logout", post(auth::logout))
        .route("/refresh", post(auth::refresh))
        .route(
            "/departments",
            get(departments::list_departments).post(departments::create_department),
        )
        .route(
            "/departments/{id}",
            get(departments::get_department)
                .put(departments::update_department)
                .delete(departments::delete_department),
        )
        .route(
            "/employees",
            get(employees::list_employees).post(employees::create_employee),
        )
        .route(
            "/employees/{id}",
            get(employees::get_employee)
                .put(employees::update_employee)
                .delete(employees::delete_employee),
        )
        .route(
            "/categories",
            get(categories::list_categories).post(categories::create_category),
        )
        .route(
            "/categories/{id}",
            get(categories::get_category)
                .put(categories::update_category)
                .delete(categories::delete_category),
        )
        .route("/assets", get(assets::list_assets).post(assets::create_asset))
        .route(
            "/assets/{id}",
            get(assets::get_asset)
                .put(assets::update_asset)
                .delete(assets::delete_asset),
        )
        .route("/audit-logs", get(audit_log::list_audit_logs))
        .route("/dashboard/summary", get(dashboard::get_summary))
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route_layer(from_fn_with_state(state.clone(), access_control_middleware));

    let public = Router::new()
        .route("/login", post(auth::login))
        .route("/health", get(health));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// GET /health - 死活監視
async fn health() -> &'static str {
    "ok"
}

/// 作成・更新の成功レスポンス
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    /// 結果メッセージ
    pub message: String,
    /// 作成・更新後のレコード
    pub data: T,
}

impl<T> DataResponse<T> {
    pub(crate) fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data,
        }
    }
}

/// メッセージのみのレスポンス（削除・ログアウト）
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// 結果メッセージ
    pub message: String,
}

impl MessageResponse {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// 一覧系エンドポイント共通のクエリパラメータ
///
/// 数値IDも文字列で受け取り、空文字は未指定、数値以外は422として扱う。
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// 部分一致検索語
    pub search: Option<String>,
    /// 部署ID
    pub department_id: Option<String>,
    /// カテゴリID
    pub category_id: Option<String>,
}

impl ListQuery {
    /// 前後空白を除いた検索語（空なら未指定）
    pub fn search(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    /// IDパラメータを解析する
    pub fn ids(&self) -> Result<(Option<i64>, Option<i64>), InventoryError> {
        let mut errors = FieldErrors::new();
        let department_id = parse_id_param(&mut errors, "department_id", self.department_id.as_deref());
        let category_id = parse_id_param(&mut errors, "category_id", self.category_id.as_deref());
        errors.into_result()?;
        Ok((department_id, category_id))
    }
}

fn parse_id_param(errors: &mut FieldErrors, field: &str, value: Option<&str>) -> Option<i64> {
    let value = value.map(str::trim).filter(|v| !v.is_empty())?;
    match value.parse::<i64>() {
        Ok(id) => Some(id),
        Err(_) => {
            errors.add(field, format!("The {} must be an integer.", field));
            None
        }
    }
}

/// 「未指定」と「null指定」を区別するためのデシリアライザ
///
/// `#[serde(default, deserialize_with = "double_option")]`と組み合わせると
/// 欠落は`None`、`null`は`Some(None)`になる。
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// 書き込み用トランザクションを開始
pub(crate) async fn begin(pool: &SqlitePool) -> Result<Transaction<'static, Sqlite>, InventoryError> {
    pool.begin()
        .await
        .map_err(|e| InventoryError::Database(format!("Failed to begin transaction: {}", e)))
}

/// トランザクションをコミット
pub(crate) async fn commit(tx: Transaction<'static, Sqlite>) -> Result<(), InventoryError> {
    tx.commit()
        .await
        .map_err(|e| InventoryError::Database(format!("Failed to commit transaction: {}", e)))
}
