//! 監査レコーダー
//!
//! ハンドラーは変更を書き込んだトランザクションのまま`record`を呼ぶ。
//! 記録に失敗した場合はエラーを返し、呼び出し側のトランザクションはコミットされない。

use crate::audit::types::NewAuditEntry;
use crate::common::auth::AuthUser;
use crate::common::error::InventoryError;
use crate::db::audit_log;
use sqlx::SqliteConnection;

/// 操作主体とクライアントIPを付けて監査イベントを記録する
pub async fn record(
    conn: &mut SqliteConnection,
    actor: &AuthUser,
    entry: NewAuditEntry,
) -> Result<(), InventoryError> {
    let id = audit_log::insert(conn, actor.id, actor.ip_address.as_deref(), &entry).await?;
    tracing::info!(
        audit_id = id,
        user_id = actor.id,
        action = %entry.action,
        table = entry.table_name,
        record_id = %entry.record_id,
        "{}",
        entry.description
    );
    Ok(())
}
