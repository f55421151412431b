//! サーバー初期化ロジック
//!
//! データベース接続、マイグレーション、初回管理者作成、JWT秘密鍵の読み込みを行い
//! `AppState`を組み立てる。

use crate::common::error::{CommonError, InventoryError};
use crate::{auth, config, jwt_secret, AppState};
use sqlx::sqlite::SqliteConnectOptions;
use std::str::FromStr;
use tracing::info;

/// サーバー初期化を実行する
///
/// # Returns
/// * `Ok(AppState)` - 初期化済みのアプリケーション状態
/// * `Err(InventoryError)` - DB接続・マイグレーション・管理者作成・秘密鍵の読み込みのいずれかに失敗
pub async fn initialize() -> Result<AppState, InventoryError> {
    info!("Asset Inventory Server v{}", env!("CARGO_PKG_VERSION"));

    let database_url = config::database_url();
    let db_pool = init_db_pool(&database_url).await?;
    run_migrations(&db_pool).await?;
    info!("Database ready");

    auth::bootstrap::ensure_admin_exists(&db_pool).await?;

    let jwt_secret = jwt_secret::get_or_create_jwt_secret()?;

    Ok(AppState {
        db_pool,
        jwt_secret,
    })
}

/// SQLite接続プールを初期化する
pub async fn init_db_pool(database_url: &str) -> Result<sqlx::SqlitePool, InventoryError> {
    // SQLiteファイルはディレクトリが存在しないと作成できないため、先に作成しておく
    if let Some(path) = database_url.strip_prefix("sqlite:") {
        // `sqlite::memory:` のような特殊指定はスキップ
        if !path.starts_with(':') {
            let normalized = path.trim_start_matches("//");
            let path_without_params = normalized.split('?').next().unwrap_or(normalized);
            let db_path = std::path::Path::new(path_without_params);
            if let Some(parent) = db_path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    CommonError::Config(format!(
                        "Failed to create database directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }
    }

    let connect_options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| CommonError::Config(format!("Invalid database URL: {}", e)))?
        .create_if_missing(true)
        .foreign_keys(true);

    sqlx::SqlitePool::connect_with(connect_options)
        .await
        .map_err(|e| InventoryError::Database(format!("Failed to connect to database: {}", e)))
}

/// マイグレーションを実行する
pub async fn run_migrations(pool: &sqlx::SqlitePool) -> Result<(), InventoryError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| InventoryError::Database(format!("Failed to run database migrations: {}", e)))
}
