// 資産CRUD操作（論理削除）

use super::employees::employee_from_parts;
use super::{map_write_error, now_timestamp, parse_optional_timestamp, parse_timestamp};
use super::TextSearch;
use crate::common::error::InventoryError;
use crate::types::{
    Asset, AssetDetails, AssetStatus, Category, Department, EmployeeDetails, Specifications,
};
use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};

const SELECT_ASSET: &str = "SELECT a.id, a.inventory_code, a.category_id, a.employee_id, \
     a.brand, a.model, a.serial_number, a.status, a.specifications, a.comments, \
     a.created_at, a.updated_at, a.deleted_at FROM assets a";

const SELECT_ASSET_WITH_RELATIONS: &str = "SELECT a.id, a.inventory_code, a.category_id, \
     a.employee_id, a.brand, a.model, a.serial_number, a.status, a.specifications, a.comments, \
     a.created_at, a.updated_at, a.deleted_at, \
     c.name AS cat_name, c.created_at AS cat_created_at, c.updated_at AS cat_updated_at, \
     e.first_name AS emp_first_name, e.last_name AS emp_last_name, e.email AS emp_email, \
     e.department_id AS emp_department_id, e.status AS emp_status, \
     e.created_at AS emp_created_at, e.updated_at AS emp_updated_at, \
     d.name AS dept_name, d.description AS dept_description, \
     d.created_at AS dept_created_at, d.updated_at AS dept_updated_at \
     FROM assets a \
     LEFT JOIN categories c ON c.id = a.category_id \
     LEFT JOIN employees e ON e.id = a.employee_id \
     LEFT JOIN departments d ON d.id = e.department_id";

/// 資産一覧の絞り込み条件
#[derive(Debug, Clone, Default)]
pub struct AssetFilter {
    /// 管理番号・メーカー・型番・シリアル・担当者名に対する部分一致検索
    pub search: Option<String>,
    /// カテゴリ
    pub category_id: Option<i64>,
    /// 担当者の所属部署
    pub department_id: Option<i64>,
}

/// 資産の書き込み内容
///
/// 更新時は既存値にリクエストの指定分を重ねた完全な値を渡す。
#[derive(Debug, Clone)]
pub struct AssetInput {
    /// 資産管理番号
    pub inventory_code: String,
    /// カテゴリID
    pub category_id: i64,
    /// 担当者ID
    pub employee_id: i64,
    /// メーカー
    pub brand: String,
    /// 型番
    pub model: String,
    /// シリアル番号
    pub serial_number: Option<String>,
    /// ステータス
    pub status: AssetStatus,
    /// 仕様
    pub specifications: Specifications,
    /// 備考
    pub comments: Option<String>,
}

/// 有効な資産の一覧を取得（登録日時の新しい順、関連付き）
///
/// # Arguments
/// * `pool` - データベース接続プール
/// * `filter` - 検索語・カテゴリ・部署による絞り込み
pub async fn list(pool: &SqlitePool, filter: &AssetFilter) -> Result<Vec<AssetDetails>, InventoryError> {
    let mut query = sqlx::QueryBuilder::new(SELECT_ASSET_WITH_RELATIONS);
    query.push(" WHERE a.deleted_at IS NULL");
    if let Some(category_id) = filter.category_id {
        query.push(" AND a.category_id = ").push_bind(category_id);
    }
    if let Some(department_id) = filter.department_id {
        query.push(" AND e.department_id = ").push_bind(department_id);
    }
    query.push(" ORDER BY a.created_at DESC, a.id DESC");

    let rows = query
        .build_query_as::<AssetWithRelationsRow>()
        .fetch_all(pool)
        .await
        .map_err(|e| InventoryError::Database(format!("Failed to list assets: {}", e)))?;

    let mut assets = rows
        .into_iter()
        .map(AssetWithRelationsRow::into_details)
        .collect::<Result<Vec<_>, _>>()?;
    if let Some(search) = filter.search.as_deref().map(TextSearch::new) {
        assets.retain(|details| {
            let a = &details.asset;
            let employee = details.employee.as_ref().map(|d| &d.employee);
            search.matches(&[
                Some(a.inventory_code.as_str()),
                Some(a.brand.as_str()),
                Some(a.model.as_str()),
                a.serial_number.as_deref(),
                employee.map(|e| e.first_name.as_str()),
                employee.map(|e| e.last_name.as_str()),
            ])
        });
    }
    Ok(assets)
}

/// 最近登録された有効な資産を取得
pub async fn recent(pool: &SqlitePool, limit: i64) -> Result<Vec<AssetDetails>, InventoryError> {
    let rows = sqlx::query_as::<_, AssetWithRelationsRow>(&format!(
        "{} WHERE a.deleted_at IS NULL ORDER BY a.created_at DESC, a.id DESC LIMIT ?",
        SELECT_ASSET_WITH_RELATIONS
    ))
    .bind(limit)
    .fetch_all(pool)
    .await
    .map_err(|e| InventoryError::Database(format!("Failed to list recent assets: {}", e)))?;

    rows.into_iter().map(AssetWithRelationsRow::into_details).collect()
}

/// 従業員に割り当てられた有効な資産を取得
pub async fn list_for_employee(
    pool: &SqlitePool,
    employee_id: i64,
) -> Result<Vec<Asset>, InventoryError> {
    let rows = sqlx::query_as::<_, AssetRow>(&format!(
        "{} WHERE a.employee_id = ? AND a.deleted_at IS NULL ORDER BY a.created_at DESC, a.id DESC",
        SELECT_ASSET
    ))
    .bind(employee_id)
    .fetch_all(pool)
    .await
    .map_err(|e| InventoryError::Database(format!("Failed to list employee assets: {}", e)))?;

    rows.into_iter().map(AssetRow::into_asset).collect()
}

/// IDで有効な資産を検索（論理削除済みはNone）
pub async fn find_live<'e, E>(executor: E, id: i64) -> Result<Option<Asset>, InventoryError>
where
    E: SqliteExecutor<'e>,
{
    let row = sqlx::query_as::<_, AssetRow>(&format!(
        "{} WHERE a.id = ? AND a.deleted_at IS NULL",
        SELECT_ASSET
    ))
    .bind(id)
    .fetch_optional(executor)
    .await
    .map_err(|e| InventoryError::Database(format!("Failed to find asset: {}", e)))?;

    row.map(AssetRow::into_asset).transpose()
}

/// IDで資産を検索（論理削除済みも含む）
pub async fn find_any<'e, E>(executor: E, id: i64) -> Result<Option<Asset>, InventoryError>
where
    E: SqliteExecutor<'e>,
{
    let row = sqlx::query_as::<_, AssetRow>(&format!("{} WHERE a.id = ?", SELECT_ASSET))
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(|e| InventoryError::Database(format!("Failed to find asset: {}", e)))?;

    row.map(AssetRow::into_asset).transpose()
}

/// 有効な資産の詳細を取得（カテゴリ・担当者・部署付き）
pub async fn find_details(pool: &SqlitePool, id: i64) -> Result<Option<AssetDetails>, InventoryError> {
    let row = sqlx::query_as::<_, AssetWithRelationsRow>(&format!(
        "{} WHERE a.id = ? AND a.deleted_at IS NULL",
        SELECT_ASSET_WITH_RELATIONS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(|e| InventoryError::Database(format!("Failed to find asset: {}", e)))?;

    row.map(AssetWithRelationsRow::into_details).transpose()
}

/// 資産管理番号が使用済みか（論理削除済みの資産も対象）
pub async fn inventory_code_taken<'e, E>(
    executor: E,
    inventory_code: &str,
    exclude_id: Option<i64>,
) -> Result<bool, InventoryError>
where
    E: SqliteExecutor<'e>,
{
    let found: Option<i64> =
        sqlx::query_scalar("SELECT id FROM assets WHERE inventory_code = ? AND id != ?")
            .bind(inventory_code)
            .bind(exclude_id.unwrap_or(0))
            .fetch_optional(executor)
            .await
            .map_err(|e| {
                InventoryError::Database(format!("Failed to check inventory code: {}", e))
            })?;
    Ok(found.is_some())
}

/// シリアル番号が使用済みか（論理削除済みの資産も対象）
pub async fn serial_number_taken<'e, E>(
    executor: E,
    serial_number: &str,
    exclude_id: Option<i64>,
) -> Result<bool, InventoryError>
where
    E: SqliteExecutor<'e>,
{
    let found: Option<i64> =
        sqlx::query_scalar("SELECT id FROM assets WHERE serial_number = ? AND id != ?")
            .bind(serial_number)
            .bind(exclude_id.unwrap_or(0))
            .fetch_optional(executor)
            .await
            .map_err(|e| {
                InventoryError::Database(format!("Failed to check serial number: {}", e))
            })?;
    Ok(found.is_some())
}

/// 有効な資産数を取得
pub async fn count_live(pool: &SqlitePool) -> Result<i64, InventoryError> {
    sqlx::query_scalar("SELECT COUNT(*) FROM assets WHERE deleted_at IS NULL")
        .fetch_one(pool)
        .await
        .map_err(|e| InventoryError::Database(format!("Failed to count assets: {}", e)))
}

/// ステータス別の有効な資産数を取得
///
/// 該当資産の無いステータスも0件として含める。
pub async fn count_by_status(pool: &SqlitePool) -> Result<Vec<(AssetStatus, i64)>, InventoryError> {
    let rows: Vec<(String, i64)> = sqlx::query_as(
        "SELECT status, COUNT(*) FROM assets WHERE deleted_at IS NULL GROUP BY status",
    )
    .fetch_all(pool)
    .await
    .map_err(|e| InventoryError::Database(format!("Failed to count assets by status: {}", e)))?;

    Ok(AssetStatus::ALL
        .iter()
        .map(|status| {
            let count = rows
                .iter()
                .find(|(raw, _)| raw == status.as_str())
                .map(|(_, count)| *count)
                .unwrap_or(0);
            (*status, count)
        })
        .collect())
}

/// 資産を登録
pub async fn insert(conn: &mut SqliteConnection, input: &AssetInput) -> Result<Asset, InventoryError> {
    let now = now_timestamp();
    let specifications = serde_json::to_string(&input.specifications)
        .map_err(|e| InventoryError::Internal(format!("Failed to encode specifications: {}", e)))?;
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO assets (inventory_code, category_id, employee_id, brand, model, serial_number,
         status, specifications, comments, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(&input.inventory_code)
    .bind(input.category_id)
    .bind(input.employee_id)
    .bind(&input.brand)
    .bind(&input.model)
    .bind(input.serial_number.as_deref())
    .bind(input.status.as_str())
    .bind(specifications)
    .bind(input.comments.as_deref())
    .bind(&now)
    .bind(&now)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| map_write_error(e, "Failed to create asset"))?;

    find_live(&mut *conn, id)
        .await?
        .ok_or_else(|| InventoryError::Database(format!("Asset {} vanished after insert", id)))
}

/// 有効な資産を更新
pub async fn update(
    conn: &mut SqliteConnection,
    id: i64,
    input: &AssetInput,
) -> Result<Asset, InventoryError> {
    let specifications = serde_json::to_string(&input.specifications)
        .map_err(|e| InventoryError::Internal(format!("Failed to encode specifications: {}", e)))?;
    let result = sqlx::query(
        "UPDATE assets SET inventory_code = ?, category_id = ?, employee_id = ?, brand = ?,
         model = ?, serial_number = ?, status = ?, specifications = ?, comments = ?, updated_at = ?
         WHERE id = ? AND deleted_at IS NULL",
    )
    .bind(&input.inventory_code)
    .bind(input.category_id)
    .bind(input.employee_id)
    .bind(&input.brand)
    .bind(&input.model)
    .bind(input.serial_number.as_deref())
    .bind(input.status.as_str())
    .bind(specifications)
    .bind(input.comments.as_deref())
    .bind(now_timestamp())
    .bind(id)
    .execute(&mut *conn)
    .await
    .map_err(|e| map_write_error(e, "Failed to update asset"))?;

    if result.rows_affected() == 0 {
        return Err(InventoryError::NotFound(format!("Asset {} not found", id)));
    }

    find_live(&mut *conn, id)
        .await?
        .ok_or_else(|| InventoryError::NotFound(format!("Asset {} not found", id)))
}

/// 資産を論理削除
///
/// 削除済みの資産は一覧・詳細・集計から除外されるが、行と管理番号は残る。
pub async fn soft_delete(conn: &mut SqliteConnection, id: i64) -> Result<(), InventoryError> {
    let now = now_timestamp();
    let result = sqlx::query(
        "UPDATE assets SET deleted_at = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
    )
    .bind(&now)
    .bind(&now)
    .bind(id)
    .execute(&mut *conn)
    .await
    .map_err(|e| map_write_error(e, "Failed to delete asset"))?;

    if result.rows_affected() == 0 {
        return Err(InventoryError::NotFound(format!("Asset {} not found", id)));
    }
    Ok(())
}

fn parse_status(value: &str) -> Result<AssetStatus, InventoryError> {
    AssetStatus::parse(value)
        .ok_or_else(|| InventoryError::Database(format!("Invalid asset status: {}", value)))
}

fn parse_specifications(value: &str) -> Result<Specifications, InventoryError> {
    serde_json::from_str(value)
        .map_err(|e| InventoryError::Database(format!("Invalid asset specifications: {}", e)))
}

#[derive(sqlx::FromRow)]
struct AssetRow {
    id: i64,
    inventory_code: String,
    category_id: Option<i64>,
    employee_id: Option<i64>,
    brand: String,
    model: String,
    serial_number: Option<String>,
    status: String,
    specifications: String,
    comments: Option<String>,
    created_at: String,
    updated_at: String,
    deleted_at: Option<String>,
}

impl AssetRow {
    fn into_asset(self) -> Result<Asset, InventoryError> {
        Ok(Asset {
            id: self.id,
            inventory_code: self.inventory_code,
            category_id: self.category_id,
            employee_id: self.employee_id,
            brand: self.brand,
            model: self.model,
            serial_number: self.serial_number,
            status: parse_status(&self.status)?,
            specifications: parse_specifications(&self.specifications)?,
            comments: self.comments,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
            deleted_at: parse_optional_timestamp(self.deleted_at.as_deref())?,
        })
    }
}

// カテゴリ・担当者・部署をLEFT JOINした行
#[derive(sqlx::FromRow)]
struct AssetWithRelationsRow {
    #[sqlx(flatten)]
    asset: AssetRow,
    cat_name: Option<String>,
    cat_created_at: Option<String>,
    cat_updated_at: Option<String>,
    emp_first_name: Option<String>,
    emp_last_name: Option<String>,
    emp_email: Option<String>,
    emp_department_id: Option<i64>,
    emp_status: Option<String>,
    emp_created_at: Option<String>,
    emp_updated_at: Option<String>,
    dept_name: Option<String>,
    dept_description: Option<String>,
    dept_created_at: Option<String>,
    dept_updated_at: Option<String>,
}

impl AssetWithRelationsRow {
    fn into_details(self) -> Result<AssetDetails, InventoryError> {
        let asset = self.asset.into_asset()?;

        let category = match (
            asset.category_id,
            self.cat_name,
            self.cat_created_at,
            self.cat_updated_at,
        ) {
            (Some(id), Some(name), Some(created_at), Some(updated_at)) => Some(Category {
                id,
                name,
                created_at: parse_timestamp(&created_at)?,
                updated_at: parse_timestamp(&updated_at)?,
            }),
            _ => None,
        };

        let department = match (
            self.emp_department_id,
            self.dept_name,
            self.dept_created_at,
            self.dept_updated_at,
        ) {
            (Some(id), Some(name), Some(created_at), Some(updated_at)) => Some(Department {
                id,
                name,
                description: self.dept_description,
                created_at: parse_timestamp(&created_at)?,
                updated_at: parse_timestamp(&updated_at)?,
            }),
            _ => None,
        };

        let employee = match (
            asset.employee_id,
            self.emp_first_name,
            self.emp_last_name,
            self.emp_department_id,
            self.emp_status,
            self.emp_created_at,
            self.emp_updated_at,
        ) {
            (
                Some(id),
                Some(first_name),
                Some(last_name),
                Some(department_id),
                Some(status),
                Some(created_at),
                Some(updated_at),
            ) => Some(EmployeeDetails {
                employee: employee_from_parts(
                    id,
                    first_name,
                    last_name,
                    self.emp_email,
                    department_id,
                    &status,
                    &created_at,
                    &updated_at,
                )?,
                department,
                assets: None,
            }),
            _ => None,
        };

        Ok(AssetDetails {
            asset,
            category,
            employee,
        })
    }
}
