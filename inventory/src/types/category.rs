use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 資産カテゴリ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// カテゴリID
    pub id: i64,
    /// カテゴリ名（一意、50文字以内）
    pub name: String,
    /// 作成日時
    pub created_at: DateTime<Utc>,
    /// 更新日時
    pub updated_at: DateTime<Utc>,
}
