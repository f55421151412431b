//! 監査ログ
//!
//! 変更操作（作成・更新・削除）を、変更本体と同じトランザクション内で
//! 追記専用の`audit_logs`テーブルへ記録する。

/// 監査ログの型定義
pub mod types;

/// 監査レコーダー
pub mod recorder;
