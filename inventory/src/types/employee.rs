use super::{Asset, Department};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 従業員ステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmployeeStatus {
    /// 在籍
    #[default]
    Active,
    /// 休職・退職
    Inactive,
}

impl EmployeeStatus {
    /// ステータスを文字列に変換
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    /// 文字列からステータスに変換（完全一致のみ）
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            _ => None,
        }
    }
}

impl fmt::Display for EmployeeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 従業員
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// 従業員ID
    pub id: i64,
    /// 名
    pub first_name: String,
    /// 姓
    pub last_name: String,
    /// メールアドレス（任意、一意）
    pub email: Option<String>,
    /// 所属部署ID
    pub department_id: i64,
    /// ステータス
    pub status: EmployeeStatus,
    /// 作成日時
    pub created_at: DateTime<Utc>,
    /// 更新日時
    pub updated_at: DateTime<Utc>,
}

impl Employee {
    /// 表示用のフルネーム
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// 関連付きの従業員（一覧・詳細レスポンス用）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeDetails {
    /// 従業員本体
    #[serde(flatten)]
    pub employee: Employee,
    /// 所属部署
    pub department: Option<Department>,
    /// 割り当て済み資産（詳細取得時のみ）
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub assets: Option<Vec<Asset>>,
}
