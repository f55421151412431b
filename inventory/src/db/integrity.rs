//! 削除前の参照整合性チェック
//!
//! 削除と同じトランザクション内で呼び出し、依存レコードが残っている場合は
//! `InventoryError::Conflict`で削除を拒否する。スキーマ側の外部キーと
//! トリガーは同じ規則の最終防衛線として働く。

use crate::common::error::InventoryError;
use sqlx::SqliteConnection;

/// 削除対象
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteTarget {
    /// 部署（所属従業員がいれば拒否）
    Department(i64),
    /// 従業員（有効な割り当て資産があれば拒否）
    Employee(i64),
    /// カテゴリ（有効な資産があれば拒否）
    Category(i64),
}

impl DeleteTarget {
    fn dependents_query(&self) -> (&'static str, i64) {
        match *self {
            Self::Department(id) => ("SELECT COUNT(*) FROM employees WHERE department_id = ?", id),
            Self::Employee(id) => (
                "SELECT COUNT(*) FROM assets WHERE employee_id = ? AND deleted_at IS NULL",
                id,
            ),
            Self::Category(id) => (
                "SELECT COUNT(*) FROM assets WHERE category_id = ? AND deleted_at IS NULL",
                id,
            ),
        }
    }

    fn conflict_message(&self, count: i64) -> String {
        match self {
            Self::Department(_) => format!(
                "Cannot delete department: it has {} assigned employee(s).",
                count
            ),
            Self::Employee(_) => format!(
                "Cannot delete employee: they have {} assigned asset(s).",
                count
            ),
            Self::Category(_) => format!(
                "Cannot delete category: it has {} registered asset(s).",
                count
            ),
        }
    }
}

/// 依存レコードが無いことを確認する
///
/// # Returns
/// * `Ok(())` - 削除可能
/// * `Err(InventoryError::Conflict)` - 依存レコードあり
pub async fn ensure_deletable(
    conn: &mut SqliteConnection,
    target: DeleteTarget,
) -> Result<(), InventoryError> {
    let (sql, id) = target.dependents_query();
    let count: i64 = sqlx::query_scalar(sql)
        .bind(id)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| InventoryError::Database(format!("Failed to check dependents: {}", e)))?;

    if count > 0 {
        tracing::debug!(?target, count, "Delete rejected by integrity guard");
        return Err(InventoryError::Conflict(target.conflict_message(count)));
    }
    Ok(())
}
