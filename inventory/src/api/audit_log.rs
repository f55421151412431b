//! 監査ログAPIハンドラー
//!
//! `/audit-logs`（AdminとAuditorのみ、許可テーブルで判定済み）

use super::error::ApiResult;
use crate::audit::types::AuditLogEntry;
use crate::db::audit_log::{AuditLogStorage, AUDIT_LOG_LIST_LIMIT};
use crate::AppState;
use axum::{extract::State, Json};

/// GET /audit-logs - 監査ログ一覧
///
/// 新しい順に最大100件。操作者が削除済みの場合は`user`がnullになる。
///
/// # Returns
/// * `200 OK` - 監査ログ一覧
/// * `403 Forbidden` - AdminでもAuditorでもない
pub async fn list_audit_logs(State(app_state): State<AppState>) -> ApiResult<Json<Vec<AuditLogEntry>>> {
    let storage = AuditLogStorage::new(app_state.db_pool.clone());
    let entries = storage.list_recent(AUDIT_LOG_LIST_LIMIT).await?;
    Ok(Json(entries))
}
