// カテゴリCRUD操作

use super::{map_write_error, now_timestamp, parse_timestamp};
use super::TextSearch;
use crate::common::error::InventoryError;
use crate::types::Category;
use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};

const SELECT_CATEGORY: &str = "SELECT id, name, created_at, updated_at FROM categories";

/// カテゴリ一覧を取得（名前昇順）
pub async fn list(pool: &SqlitePool, search: Option<&str>) -> Result<Vec<Category>, InventoryError> {
    let rows = sqlx::query_as::<_, CategoryRow>(&format!(
        "{} ORDER BY name ASC, id ASC",
        SELECT_CATEGORY
    ))
    .fetch_all(pool)
    .await
    .map_err(|e| InventoryError::Database(format!("Failed to list categories: {}", e)))?;

    let mut categories = rows
        .into_iter()
        .map(CategoryRow::into_category)
        .collect::<Result<Vec<_>, _>>()?;
    if let Some(search) = search.map(TextSearch::new) {
        categories.retain(|c| search.matches(&[Some(c.name.as_str())]));
    }
    Ok(categories)
}

/// IDでカテゴリを検索
pub async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<Category>, InventoryError>
where
    E: SqliteExecutor<'e>,
{
    let row = sqlx::query_as::<_, CategoryRow>(&format!("{} WHERE id = ?", SELECT_CATEGORY))
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(|e| InventoryError::Database(format!("Failed to find category: {}", e)))?;

    row.map(CategoryRow::into_category).transpose()
}

/// カテゴリが存在するか
pub async fn exists<'e, E>(executor: E, id: i64) -> Result<bool, InventoryError>
where
    E: SqliteExecutor<'e>,
{
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM categories WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(|e| InventoryError::Database(format!("Failed to check category: {}", e)))?;
    Ok(found.is_some())
}

/// カテゴリ名が使用済みか（大文字小文字を区別しない、`exclude_id`の行は除外）
pub async fn name_taken(
    pool: &SqlitePool,
    name: &str,
    exclude_id: Option<i64>,
) -> Result<bool, InventoryError> {
    let names: Vec<String> =
        sqlx::query_scalar("SELECT name FROM categories WHERE id != ?")
            .bind(exclude_id.unwrap_or(0))
            .fetch_all(pool)
            .await
            .map_err(|e| {
                InventoryError::Database(format!("Failed to check category name: {}", e))
            })?;
    let name = TextSearch::new(name);
    Ok(names.iter().any(|existing| name.equals(existing)))
}

/// カテゴリを作成
pub async fn insert(conn: &mut SqliteConnection, name: &str) -> Result<Category, InventoryError> {
    let now = now_timestamp();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO categories (name, created_at, updated_at) VALUES (?, ?, ?) RETURNING id",
    )
    .bind(name)
    .bind(&now)
    .bind(&now)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| map_write_error(e, "Failed to create category"))?;

    find_by_id(&mut *conn, id)
        .await?
        .ok_or_else(|| InventoryError::Database(format!("Category {} vanished after insert", id)))
}

/// カテゴリ名を変更
pub async fn rename(
    conn: &mut SqliteConnection,
    id: i64,
    name: &str,
) -> Result<Category, InventoryError> {
    sqlx::query("UPDATE categories SET name = ?, updated_at = ? WHERE id = ?")
        .bind(name)
        .bind(now_timestamp())
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(|e| map_write_error(e, "Failed to update category"))?;

    find_by_id(&mut *conn, id)
        .await?
        .ok_or_else(|| InventoryError::NotFound(format!("Category {} not found", id)))
}

/// カテゴリを削除（事前に`integrity::ensure_deletable`を呼ぶこと）
pub async fn delete(conn: &mut SqliteConnection, id: i64) -> Result<(), InventoryError> {
    sqlx::query("DELETE FROM categories WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(|e| map_write_error(e, "Failed to delete category"))?;
    Ok(())
}

#[derive(sqlx::FromRow)]
pub(crate) struct CategoryRow {
    id: i64,
    name: String,
    created_at: String,
    updated_at: String,
}

impl CategoryRow {
    pub(crate) fn into_category(self) -> Result<Category, InventoryError> {
        Ok(Category {
            id: self.id,
            name: self.name,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}
