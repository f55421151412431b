use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 部署
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
    /// 部署ID
    pub id: i64,
    /// 部署名（一意）
    pub name: String,
    /// 説明
    pub description: Option<String>,
    /// 作成日時
    pub created_at: DateTime<Utc>,
    /// 更新日時
    pub updated_at: DateTime<Utc>,
}
