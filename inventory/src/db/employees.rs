// 従業員CRUD操作

use super::{map_write_error, now_timestamp, parse_timestamp};
use super::TextSearch;
use crate::common::error::InventoryError;
use crate::types::{Department, Employee, EmployeeDetails, EmployeeStatus};
use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};

const SELECT_EMPLOYEE: &str = "SELECT id, first_name, last_name, email, department_id, status, \
     created_at, updated_at FROM employees";

const SELECT_EMPLOYEE_WITH_DEPARTMENT: &str = "SELECT e.id, e.first_name, e.last_name, e.email, \
     e.department_id, e.status, e.created_at, e.updated_at, \
     d.id AS dept_id, d.name AS dept_name, d.description AS dept_description, \
     d.created_at AS dept_created_at, d.updated_at AS dept_updated_at \
     FROM employees e LEFT JOIN departments d ON d.id = e.department_id";

/// 従業員一覧の絞り込み条件
#[derive(Debug, Clone, Default)]
pub struct EmployeeFilter {
    /// 名・姓・メールに対する部分一致検索
    pub search: Option<String>,
    /// 所属部署
    pub department_id: Option<i64>,
}

/// 従業員の書き込み内容（作成・全置換更新で共通）
#[derive(Debug, Clone)]
pub struct EmployeeInput {
    /// 名
    pub first_name: String,
    /// 姓
    pub last_name: String,
    /// メールアドレス
    pub email: Option<String>,
    /// 所属部署ID
    pub department_id: i64,
    /// ステータス
    pub status: EmployeeStatus,
}

/// 従業員一覧を取得（姓・名の昇順、部署付き）
///
/// # Arguments
/// * `pool` - データベース接続プール
/// * `filter` - 検索語と部署による絞り込み
pub async fn list(
    pool: &SqlitePool,
    filter: &EmployeeFilter,
) -> Result<Vec<EmployeeDetails>, InventoryError> {
    let mut query = sqlx::QueryBuilder::new(SELECT_EMPLOYEE_WITH_DEPARTMENT);
    query.push(" WHERE 1 = 1");
    if let Some(department_id) = filter.department_id {
        query.push(" AND e.department_id = ").push_bind(department_id);
    }
    query.push(" ORDER BY e.last_name ASC, e.first_name ASC, e.id ASC");

    let rows = query
        .build_query_as::<EmployeeWithDepartmentRow>()
        .fetch_all(pool)
        .await
        .map_err(|e| InventoryError::Database(format!("Failed to list employees: {}", e)))?;

    let mut employees = rows
        .into_iter()
        .map(EmployeeWithDepartmentRow::into_details)
        .collect::<Result<Vec<_>, _>>()?;
    if let Some(search) = filter.search.as_deref().map(TextSearch::new) {
        employees.retain(|details| {
            let e = &details.employee;
            search.matches(&[
                Some(e.first_name.as_str()),
                Some(e.last_name.as_str()),
                e.email.as_deref(),
            ])
        });
    }
    Ok(employees)
}

/// IDで従業員を検索
pub async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<Employee>, InventoryError>
where
    E: SqliteExecutor<'e>,
{
    let row = sqlx::query_as::<_, EmployeeRow>(&format!("{} WHERE id = ?", SELECT_EMPLOYEE))
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(|e| InventoryError::Database(format!("Failed to find employee: {}", e)))?;

    row.map(EmployeeRow::into_employee).transpose()
}

/// 従業員詳細を取得（部署と有効な割り当て資産付き）
pub async fn find_details(
    pool: &SqlitePool,
    id: i64,
) -> Result<Option<EmployeeDetails>, InventoryError> {
    let row = sqlx::query_as::<_, EmployeeWithDepartmentRow>(&format!(
        "{} WHERE e.id = ?",
        SELECT_EMPLOYEE_WITH_DEPARTMENT
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(|e| InventoryError::Database(format!("Failed to find employee: {}", e)))?;

    let Some(row) = row else {
        return Ok(None);
    };
    let mut details = row.into_details()?;
    details.assets = Some(super::assets::list_for_employee(pool, id).await?);
    Ok(Some(details))
}

/// 従業員が存在するか
pub async fn exists<'e, E>(executor: E, id: i64) -> Result<bool, InventoryError>
where
    E: SqliteExecutor<'e>,
{
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM employees WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(|e| InventoryError::Database(format!("Failed to check employee: {}", e)))?;
    Ok(found.is_some())
}

/// メールアドレスが他の従業員に使用済みか
pub async fn email_taken(
    pool: &SqlitePool,
    email: &str,
    exclude_id: Option<i64>,
) -> Result<bool, InventoryError> {
    let found: Option<i64> =
        sqlx::query_scalar("SELECT id FROM employees WHERE email = ? AND id != ?")
            .bind(email)
            .bind(exclude_id.unwrap_or(0))
            .fetch_optional(pool)
            .await
            .map_err(|e| {
                InventoryError::Database(format!("Failed to check employee email: {}", e))
            })?;
    Ok(found.is_some())
}

/// 従業員数を取得
pub async fn count(pool: &SqlitePool) -> Result<i64, InventoryError> {
    sqlx::query_scalar("SELECT COUNT(*) FROM employees")
        .fetch_one(pool)
        .await
        .map_err(|e| InventoryError::Database(format!("Failed to count employees: {}", e)))
}

/// 従業員を作成
pub async fn insert(
    conn: &mut SqliteConnection,
    input: &EmployeeInput,
) -> Result<Employee, InventoryError> {
    let now = now_timestamp();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO employees (first_name, last_name, email, department_id, status, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(&input.first_name)
    .bind(&input.last_name)
    .bind(input.email.as_deref())
    .bind(input.department_id)
    .bind(input.status.as_str())
    .bind(&now)
    .bind(&now)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| map_write_error(e, "Failed to create employee"))?;

    find_by_id(&mut *conn, id)
        .await?
        .ok_or_else(|| InventoryError::Database(format!("Employee {} vanished after insert", id)))
}

/// 従業員を全置換で更新
pub async fn update(
    conn: &mut SqliteConnection,
    id: i64,
    input: &EmployeeInput,
) -> Result<Employee, InventoryError> {
    sqlx::query(
        "UPDATE employees SET first_name = ?, last_name = ?, email = ?, department_id = ?,
         status = ?, updated_at = ? WHERE id = ?",
    )
    .bind(&input.first_name)
    .bind(&input.last_name)
    .bind(input.email.as_deref())
    .bind(input.department_id)
    .bind(input.status.as_str())
    .bind(now_timestamp())
    .bind(id)
    .execute(&mut *conn)
    .await
    .map_err(|e| map_write_error(e, "Failed to update employee"))?;

    find_by_id(&mut *conn, id)
        .await?
        .ok_or_else(|| InventoryError::NotFound(format!("Employee {} not found", id)))
}

/// 従業員を削除（事前に`integrity::ensure_deletable`を呼ぶこと）
///
/// 論理削除済みの資産からの参照はNULLになる。
pub async fn delete(conn: &mut SqliteConnection, id: i64) -> Result<(), InventoryError> {
    sqlx::query("DELETE FROM employees WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(|e| map_write_error(e, "Failed to delete employee"))?;
    Ok(())
}

fn parse_status(value: &str) -> Result<EmployeeStatus, InventoryError> {
    EmployeeStatus::parse(value)
        .ok_or_else(|| InventoryError::Database(format!("Invalid employee status: {}", value)))
}

#[derive(sqlx::FromRow)]
struct EmployeeRow {
    id: i64,
    first_name: String,
    last_name: String,
    email: Option<String>,
    department_id: i64,
    status: String,
    created_at: String,
    updated_at: String,
}

impl EmployeeRow {
    fn into_employee(self) -> Result<Employee, InventoryError> {
        Ok(Employee {
            id: self.id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            department_id: self.department_id,
            status: parse_status(&self.status)?,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

// 部署をLEFT JOINした行
#[derive(sqlx::FromRow)]
struct EmployeeWithDepartmentRow {
    #[sqlx(flatten)]
    employee: EmployeeRow,
    dept_id: Option<i64>,
    dept_name: Option<String>,
    dept_description: Option<String>,
    dept_created_at: Option<String>,
    dept_updated_at: Option<String>,
}

impl EmployeeWithDepartmentRow {
    fn into_details(self) -> Result<EmployeeDetails, InventoryError> {
        let department = match (
            self.dept_id,
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
        Ok(EmployeeDetails {
            employee: self.employee.into_employee()?,
            department,
            assets: None,
        })
    }
}

/// 資産一覧のJOIN結果から従業員を組み立てる
#[allow(clippy::too_many_arguments)]
pub(crate) fn employee_from_parts(
    id: i64,
    first_name: String,
    last_name: String,
    email: Option<String>,
    department_id: i64,
    status: &str,
    created_at: &str,
    updated_at: &str,
) -> Result<Employee, InventoryError> {
    Ok(Employee {
        id,
        first_name,
        last_name,
        email,
        department_id,
        status: parse_status(status)?,
        created_at: parse_timestamp(created_at)?,
        updated_at: parse_timestamp(updated_at)?,
    })
}
