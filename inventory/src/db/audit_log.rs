//! 監査ログストレージ
//!
//! `audit_logs`は追記専用。更新・削除はスキーマのトリガーで拒否される。

use super::{now_timestamp, parse_timestamp};
use crate::audit::types::{AuditAction, AuditLogEntry, AuditUser, NewAuditEntry};
use crate::common::error::InventoryError;
use sqlx::{SqliteConnection, SqlitePool};

/// 一覧で返す最大件数
pub const AUDIT_LOG_LIST_LIMIT: i64 = 100;

/// 監査ログを1件追記
///
/// # Arguments
/// * `conn` - 変更本体と同じトランザクション
/// * `user_id` - 操作したユーザーのID
/// * `ip_address` - クライアントIPアドレス
/// * `entry` - 記録内容
///
/// # Returns
/// * `Ok(i64)` - 追記したレコードのID
pub async fn insert(
    conn: &mut SqliteConnection,
    user_id: i64,
    ip_address: Option<&str>,
    entry: &NewAuditEntry,
) -> Result<i64, InventoryError> {
    sqlx::query_scalar(
        "INSERT INTO audit_logs (user_id, action, table_name, record_id, description, ip_address, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(user_id)
    .bind(entry.action.as_str())
    .bind(entry.table_name)
    .bind(&entry.record_id)
    .bind(&entry.description)
    .bind(ip_address)
    .bind(now_timestamp())
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| InventoryError::Database(format!("Failed to insert audit log: {}", e)))
}

/// 監査ログの参照用ストレージ
#[derive(Clone)]
pub struct AuditLogStorage {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct AuditLogRow {
    id: i64,
    user_id: Option<i64>,
    action: String,
    table_name: String,
    record_id: String,
    description: String,
    ip_address: Option<String>,
    created_at: String,
    joined_user_id: Option<i64>,
    user_name: Option<String>,
    user_email: Option<String>,
    user_role: Option<String>,
}

impl TryFrom<AuditLogRow> for AuditLogEntry {
    type Error = InventoryError;

    fn try_from(row: AuditLogRow) -> Result<Self, Self::Error> {
        let action = AuditAction::parse(&row.action).ok_or_else(|| {
            InventoryError::Database(format!("Invalid audit action: {}", row.action))
        })?;
        let user = match (row.joined_user_id, row.user_name, row.user_email, row.user_role) {
            (Some(id), Some(name), Some(email), Some(role)) => Some(AuditUser {
                id,
                name,
                email,
                role,
            }),
            _ => None,
        };

        Ok(AuditLogEntry {
            id: row.id,
            user_id: row.user_id,
            action,
            table_name: row.table_name,
            record_id: row.record_id,
            description: row.description,
            ip_address: row.ip_address,
            created_at: parse_timestamp(&row.created_at)?,
            user,
        })
    }
}

impl AuditLogStorage {
    /// 新しいAuditLogStorageを作成
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// 新しい順に監査ログを取得（ユーザー情報付き）
    pub async fn list_recent(&self, limit: i64) -> Result<Vec<AuditLogEntry>, InventoryError> {
        let rows = sqlx::query_as::<_, AuditLogRow>(
            "SELECT l.id, l.user_id, l.action, l.table_name, l.record_id, l.description, \
             l.ip_address, l.created_at, \
             u.id AS joined_user_id, u.name AS user_name, u.email AS user_email, u.role AS user_role \
             FROM audit_logs l LEFT JOIN users u ON u.id = l.user_id \
             ORDER BY l.created_at DESC, l.id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| InventoryError::Database(format!("Failed to query audit logs: {}", e)))?;

        rows.into_iter()
            .map(AuditLogEntry::try_from)
            .collect::<Result<Vec<_>, _>>()
    }

    /// 監査ログの総件数
    pub async fn count(&self) -> Result<i64, InventoryError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM audit_logs")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| InventoryError::Database(format!("Failed to count audit logs: {}", e)))
    }
}
