// 部署CRUD操作

use super::{map_write_error, now_timestamp, parse_timestamp};
use super::TextSearch;
use crate::common::error::InventoryError;
use crate::types::Department;
use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};

const SELECT_DEPARTMENT: &str =
    "SELECT id, name, description, created_at, updated_at FROM departments";

/// 部署一覧を取得（名前昇順）
///
/// # Arguments
/// * `pool` - データベース接続プール
/// * `search` - 名前・説明に対する部分一致検索（大文字小文字を区別しない）
pub async fn list(pool: &SqlitePool, search: Option<&str>) -> Result<Vec<Department>, InventoryError> {
    let rows = sqlx::query_as::<_, DepartmentRow>(&format!(
        "{} ORDER BY name ASC, id ASC",
        SELECT_DEPARTMENT
    ))
    .fetch_all(pool)
    .await
    .map_err(|e| InventoryError::Database(format!("Failed to list departments: {}", e)))?;

    let mut departments = rows
        .into_iter()
        .map(DepartmentRow::into_department)
        .collect::<Result<Vec<_>, _>>()?;
    if let Some(search) = search.map(TextSearch::new) {
        departments
            .retain(|d| search.matches(&[Some(d.name.as_str()), d.description.as_deref()]));
    }
    Ok(departments)
}

/// IDで部署を検索
pub async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<Department>, InventoryError>
where
    E: SqliteExecutor<'e>,
{
    let row = sqlx::query_as::<_, DepartmentRow>(&format!("{} WHERE id = ?", SELECT_DEPARTMENT))
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(|e| InventoryError::Database(format!("Failed to find department: {}", e)))?;

    row.map(DepartmentRow::into_department).transpose()
}

/// 部署が存在するか
pub async fn exists<'e, E>(executor: E, id: i64) -> Result<bool, InventoryError>
where
    E: SqliteExecutor<'e>,
{
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM departments WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(|e| InventoryError::Database(format!("Failed to check department: {}", e)))?;
    Ok(found.is_some())
}

/// 部署名が使用済みか（大文字小文字を区別しない、`exclude_id`の行は除外）
pub async fn name_taken(
    pool: &SqlitePool,
    name: &str,
    exclude_id: Option<i64>,
) -> Result<bool, InventoryError> {
    let names: Vec<String> =
        sqlx::query_scalar("SELECT name FROM departments WHERE id != ?")
            .bind(exclude_id.unwrap_or(0))
            .fetch_all(pool)
            .await
            .map_err(|e| {
                InventoryError::Database(format!("Failed to check department name: {}", e))
            })?;
    let name = TextSearch::new(name);
    Ok(names.iter().any(|existing| name.equals(existing)))
}

/// 部署数を取得
pub async fn count(pool: &SqlitePool) -> Result<i64, InventoryError> {
    sqlx::query_scalar("SELECT COUNT(*) FROM departments")
        .fetch_one(pool)
        .await
        .map_err(|e| InventoryError::Database(format!("Failed to count departments: {}", e)))
}

/// 部署を作成
pub async fn insert(
    conn: &mut SqliteConnection,
    name: &str,
    description: Option<&str>,
) -> Result<Department, InventoryError> {
    let now = now_timestamp();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO departments (name, description, created_at, updated_at)
         VALUES (?, ?, ?, ?) RETURNING id",
    )
    .bind(name)
    .bind(description)
    .bind(&now)
    .bind(&now)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| map_write_error(e, "Failed to create department"))?;

    find_by_id(&mut *conn, id)
        .await?
        .ok_or_else(|| InventoryError::Database(format!("Department {} vanished after insert", id)))
}

/// 部署を更新
pub async fn update(
    conn: &mut SqliteConnection,
    id: i64,
    name: &str,
    description: Option<&str>,
) -> Result<Department, InventoryError> {
    sqlx::query("UPDATE departments SET name = ?, description = ?, updated_at = ? WHERE id = ?")
        .bind(name)
        .bind(description)
        .bind(now_timestamp())
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(|e| map_write_error(e, "Failed to update department"))?;

    find_by_id(&mut *conn, id)
        .await?
        .ok_or_else(|| InventoryError::NotFound(format!("Department {} not found", id)))
}

/// 部署を削除（事前に`integrity::ensure_deletable`を呼ぶこと）
pub async fn delete(conn: &mut SqliteConnection, id: i64) -> Result<(), InventoryError> {
    sqlx::query("DELETE FROM departments WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(|e| map_write_error(e, "Failed to delete department"))?;
    Ok(())
}

// SQLiteからの行取得用の内部型
#[derive(sqlx::FromRow)]
pub(crate) struct DepartmentRow {
    id: i64,
    name: String,
    description: Option<String>,
    created_at: String,
    updated_at: String,
}

impl DepartmentRow {
    pub(crate) fn into_department(self) -> Result<Department, InventoryError> {
        Ok(Department {
            id: self.id,
            name: self.name,
            description: self.description,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}
