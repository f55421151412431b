//! 監査ログの型定義

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 監査対象の操作種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditAction {
    /// 作成
    Create,
    /// 更新
    Update,
    /// 削除
    Delete,
}

impl AuditAction {
    /// 文字列からAuditActionに変換
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CREATE" => Some(Self::Create),
            "UPDATE" => Some(Self::Update),
            "DELETE" => Some(Self::Delete),
            _ => None,
        }
    }

    /// AuditActionを文字列に変換
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 記録する監査イベント（アクターとIPはレコーダーが補う）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuditEntry {
    /// 操作種別
    pub action: AuditAction,
    /// 対象テーブル名
    pub table_name: &'static str,
    /// 対象レコードの識別子（資産は管理番号）
    pub record_id: String,
    /// 人が読める説明文
    pub description: String,
}

impl NewAuditEntry {
    /// 作成イベント
    pub fn create(
        table_name: &'static str,
        record_id: impl ToString,
        description: impl Into<String>,
    ) -> Self {
        Self::new(AuditAction::Create, table_name, record_id, description)
    }

    /// 更新イベント
    pub fn update(
        table_name: &'static str,
        record_id: impl ToString,
        description: impl Into<String>,
    ) -> Self {
        Self::new(AuditAction::Update, table_name, record_id, description)
    }

    /// 削除イベント
    pub fn delete(
        table_name: &'static str,
        record_id: impl ToString,
        description: impl Into<String>,
    ) -> Self {
        Self::new(AuditAction::Delete, table_name, record_id, description)
    }

    fn new(
        action: AuditAction,
        table_name: &'static str,
        record_id: impl ToString,
        description: impl Into<String>,
    ) -> Self {
        Self {
            action,
            table_name,
            record_id: record_id.to_string(),
            description: description.into(),
        }
    }
}

/// 監査ログに紐づくユーザー情報（削除済みユーザーはNone）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditUser {
    /// ユーザーID
    pub id: i64,
    /// 表示名
    pub name: String,
    /// メールアドレス
    pub email: String,
    /// ロール
    pub role: String,
}

/// 監査ログエントリ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    /// レコードID
    pub id: i64,
    /// 操作したユーザーのID
    pub user_id: Option<i64>,
    /// 操作種別
    pub action: AuditAction,
    /// 対象テーブル名
    pub table_name: String,
    /// 対象レコードの識別子
    pub record_id: String,
    /// 説明文
    pub description: String,
    /// クライアントIPアドレス
    pub ip_address: Option<String>,
    /// 記録日時
    pub created_at: DateTime<Utc>,
    /// 操作したユーザー
    pub user: Option<AuditUser>,
}
