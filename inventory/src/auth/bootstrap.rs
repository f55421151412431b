//! 初回起動時の管理者アカウント作成
//!
//! 環境変数または対話式で管理者を作成

use crate::auth::password::hash_password;
use crate::common::auth::UserRole;
use crate::common::error::InventoryError;
use crate::common::validation::is_valid_email;
use crate::config::{get_env_with_fallback, get_env_with_fallback_or};
use crate::db;
use sqlx::SqlitePool;
use std::io::{self, IsTerminal, Write};

/// 管理者メールアドレスの既定値
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@example.com";
/// 管理者表示名の既定値
pub const DEFAULT_ADMIN_NAME: &str = "Administrator";
/// パスワードの最小長
const MIN_PASSWORD_LENGTH: usize = 6;

/// 管理者をトランザクション内で作成
async fn create_admin(
    pool: &SqlitePool,
    name: &str,
    email: &str,
    password: &str,
) -> Result<String, InventoryError> {
    if !is_valid_email(email) {
        return Err(InventoryError::Internal(format!(
            "Admin email '{}' is not a valid email address",
            email
        )));
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(InventoryError::Internal(format!(
            "Admin password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }

    let password_hash = hash_password(password)?;
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| InventoryError::Database(format!("Failed to begin transaction: {}", e)))?;
    let user = db::users::create(&mut tx, name, email, &password_hash, UserRole::Admin).await?;
    tx.commit()
        .await
        .map_err(|e| InventoryError::Database(format!("Failed to commit transaction: {}", e)))?;
    Ok(user.email)
}

/// 環境変数から管理者を作成
///
/// # Environment Variables
/// * `INVENTORY_ADMIN_PASSWORD` - 管理者パスワード（必須、旧: `ADMIN_PASSWORD`）
/// * `INVENTORY_ADMIN_EMAIL` - 管理者メールアドレス（省略時: "admin@example.com"）
/// * `INVENTORY_ADMIN_NAME` - 管理者表示名（省略時: "Administrator"）
///
/// # Returns
/// * `Ok(Some(email))` - 管理者作成成功
/// * `Ok(None)` - パスワードが未設定（作成しない）
/// * `Err(InventoryError)` - 作成失敗
pub async fn create_admin_from_env(pool: &SqlitePool) -> Result<Option<String>, InventoryError> {
    let password = match get_env_with_fallback("INVENTORY_ADMIN_PASSWORD", "ADMIN_PASSWORD") {
        Some(p) if !p.is_empty() => p,
        _ => {
            tracing::debug!("INVENTORY_ADMIN_PASSWORD not set, skipping admin creation from env");
            return Ok(None);
        }
    };
    let email =
        get_env_with_fallback_or("INVENTORY_ADMIN_EMAIL", "ADMIN_EMAIL", DEFAULT_ADMIN_EMAIL);
    let name = get_env_with_fallback_or("INVENTORY_ADMIN_NAME", "ADMIN_NAME", DEFAULT_ADMIN_NAME);

    let email = create_admin(pool, &name, &email, &password).await?;
    tracing::info!("Created admin user from env: email={}", email);
    Ok(Some(email))
}

/// 対話式で管理者を作成
pub async fn create_admin_interactive(pool: &SqlitePool) -> Result<String, InventoryError> {
    println!("\n=== Initial Setup: Create Admin User ===");

    print!("Enter admin email (default: {}): ", DEFAULT_ADMIN_EMAIL);
    let _ = io::stdout().flush();
    let mut email = String::new();
    io::stdin()
        .read_line(&mut email)
        .map_err(|e| InventoryError::Internal(format!("Failed to read email: {}", e)))?;
    let email = match email.trim() {
        "" => DEFAULT_ADMIN_EMAIL,
        value => value,
    };

    let password = rpassword::prompt_password("Enter admin password: ")
        .map_err(|e| InventoryError::Internal(format!("Failed to read password: {}", e)))?;

    match create_admin(pool, DEFAULT_ADMIN_NAME, email, password.trim()).await {
        Ok(email) => {
            println!("✓ Admin user '{}' created successfully", email);
            tracing::info!("Created admin user interactively: email={}", email);
            Ok(email)
        }
        Err(e) => {
            println!("✗ Failed to create admin user: {}", e);
            tracing::error!("Failed to create admin user interactively: {}", e);
            Err(e)
        }
    }
}

/// 初回起動時の管理者作成処理
///
/// 1. データベースにユーザーが存在するかチェック
/// 2. ユーザーが存在しない場合:
///    a. 環境変数（INVENTORY_ADMIN_PASSWORD）が設定されていれば環境変数から作成
///    b. 未設定で標準入力が端末なら対話式で作成
///    c. どちらも不可なら警告のみ（ログインできる利用者がいない状態で起動する）
/// 3. ユーザーが既に存在する場合はスキップ
pub async fn ensure_admin_exists(pool: &SqlitePool) -> Result<(), InventoryError> {
    if !db::users::is_first_boot(pool).await? {
        tracing::debug!("Users already exist, skipping admin creation");
        return Ok(());
    }

    tracing::info!("First boot detected, creating admin user");

    if let Some(email) = create_admin_from_env(pool).await? {
        tracing::info!("Admin user created from environment: {}", email);
        return Ok(());
    }

    if io::stdin().is_terminal() {
        tracing::info!("INVENTORY_ADMIN_PASSWORD not set, prompting for admin credentials");
        create_admin_interactive(pool).await?;
    } else {
        tracing::warn!(
            "No users exist and INVENTORY_ADMIN_PASSWORD is not set; nobody will be able to log in"
        );
    }
    Ok(())
}
