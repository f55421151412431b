// ユーザーCRUD操作

use super::{map_write_error, now_timestamp, parse_timestamp};
use crate::common::auth::{User, UserRole};
use crate::common::error::InventoryError;
use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};

const SELECT_USER: &str =
    "SELECT id, name, email, password_hash, role, is_active, created_at, updated_at FROM users";

/// ユーザーの更新内容
#[derive(Debug, Clone)]
pub struct UserChanges {
    /// 表示名
    pub name: String,
    /// メールアドレス
    pub email: String,
    /// ロール
    pub role: UserRole,
    /// 有効フラグ（Noneの場合は変更なし）
    pub is_active: Option<bool>,
    /// 新しいパスワードハッシュ（Noneの場合は変更なし）
    pub password_hash: Option<String>,
}

/// ユーザーを作成
///
/// # Arguments
/// * `conn` - データベース接続（トランザクション）
/// * `name` - 表示名
/// * `email` - メールアドレス（ログインID）
/// * `password_hash` - bcryptハッシュ化されたパスワード
/// * `role` - ユーザーロール
///
/// # Returns
/// * `Ok(User)` - 作成されたユーザー
/// * `Err(InventoryError)` - 作成失敗（メールアドレス重複など）
pub async fn create(
    conn: &mut SqliteConnection,
    name: &str,
    email: &str,
    password_hash: &str,
    role: UserRole,
) -> Result<User, InventoryError> {
    let now = now_timestamp();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO users (name, email, password_hash, role, is_active, created_at, updated_at)
         VALUES (?, ?, ?, ?, 1, ?, ?) RETURNING id",
    )
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(role.as_str())
    .bind(&now)
    .bind(&now)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| map_write_error(e, "Failed to create user"))?;

    find_by_id(&mut *conn, id)
        .await?
        .ok_or_else(|| InventoryError::Database(format!("User {} vanished after insert", id)))
}

/// メールアドレスでユーザーを検索
///
/// # Returns
/// * `Ok(Some(User))` - ユーザーが見つかった
/// * `Ok(None)` - ユーザーが見つからなかった
/// * `Err(InventoryError)` - 検索失敗
pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>, InventoryError> {
    let row = sqlx::query_as::<_, UserRow>(&format!("{} WHERE email = ?", SELECT_USER))
        .bind(email)
        .fetch_optional(pool)
        .await
        .map_err(|e| InventoryError::Database(format!("Failed to find user: {}", e)))?;

    row.map(UserRow::into_user).transpose()
}

/// IDでユーザーを検索
pub async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<User>, InventoryError>
where
    E: SqliteExecutor<'e>,
{
    let row = sqlx::query_as::<_, UserRow>(&format!("{} WHERE id = ?", SELECT_USER))
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(|e| InventoryError::Database(format!("Failed to find user: {}", e)))?;

    row.map(UserRow::into_user).transpose()
}

/// 指定ユーザー以外の全ユーザーを取得（ID昇順）
pub async fn list_excluding(pool: &SqlitePool, exclude_id: i64) -> Result<Vec<User>, InventoryError> {
    let rows = sqlx::query_as::<_, UserRow>(&format!(
        "{} WHERE id != ? ORDER BY id ASC",
        SELECT_USER
    ))
    .bind(exclude_id)
    .fetch_all(pool)
    .await
    .map_err(|e| InventoryError::Database(format!("Failed to list users: {}", e)))?;

    rows.into_iter().map(UserRow::into_user).collect()
}

/// メールアドレスが他のユーザーに使用済みか
pub async fn email_taken(
    pool: &SqlitePool,
    email: &str,
    exclude_id: Option<i64>,
) -> Result<bool, InventoryError> {
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE email = ? AND id != ?")
        .bind(email)
        .bind(exclude_id.unwrap_or(0))
        .fetch_optional(pool)
        .await
        .map_err(|e| InventoryError::Database(format!("Failed to check user email: {}", e)))?;
    Ok(found.is_some())
}

/// ユーザーを更新
pub async fn update(
    conn: &mut SqliteConnection,
    id: i64,
    changes: &UserChanges,
) -> Result<User, InventoryError> {
    let current = find_by_id(&mut *conn, id)
        .await?
        .ok_or_else(|| InventoryError::NotFound(format!("User {} not found", id)))?;

    let is_active = changes.is_active.unwrap_or(current.is_active);
    let password_hash = changes
        .password_hash
        .as_deref()
        .unwrap_or(&current.password_hash);

    sqlx::query(
        "UPDATE users SET name = ?, email = ?, role = ?, is_active = ?, password_hash = ?,
         updated_at = ? WHERE id = ?",
    )
    .bind(&changes.name)
    .bind(&changes.email)
    .bind(changes.role.as_str())
    .bind(is_active)
    .bind(password_hash)
    .bind(now_timestamp())
    .bind(id)
    .execute(&mut *conn)
    .await
    .map_err(|e| map_write_error(e, "Failed to update user"))?;

    find_by_id(&mut *conn, id)
        .await?
        .ok_or_else(|| InventoryError::NotFound(format!("User {} not found", id)))
}

/// ユーザーを削除
///
/// 監査ログの`user_id`は残り、一覧では`user: null`として表示される。
pub async fn delete(conn: &mut SqliteConnection, id: i64) -> Result<(), InventoryError> {
    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(|e| map_write_error(e, "Failed to delete user"))?;
    Ok(())
}

/// 初回起動判定（ユーザーが1人も存在しないか）
pub async fn is_first_boot(pool: &SqlitePool) -> Result<bool, InventoryError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await
        .map_err(|e| InventoryError::Database(format!("Failed to count users: {}", e)))?;
    Ok(count == 0)
}

// SQLiteからの行取得用の内部型
#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    is_active: bool,
    created_at: String,
    updated_at: String,
}

impl UserRow {
    fn into_user(self) -> Result<User, InventoryError> {
        Ok(User {
            id: self.id,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            role: UserRole::parse(&self.role),
            raw_role: self.role,
            is_active: self.is_active,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}
