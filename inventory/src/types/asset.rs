use super::{Category, EmployeeDetails};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 資産の仕様マップ（任意キー → 文字列値）
pub type Specifications = BTreeMap<String, String>;

/// 資産ステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssetStatus {
    /// 稼働中
    #[default]
    Operational,
    /// 修理中
    UnderRepair,
    /// 陳腐化
    Obsolete,
    /// 廃棄済み
    Retired,
    /// 利用可能（未使用）
    Available,
}

impl AssetStatus {
    /// すべてのステータス
    pub const ALL: [AssetStatus; 5] = [
        AssetStatus::Operational,
        AssetStatus::UnderRepair,
        AssetStatus::Obsolete,
        AssetStatus::Retired,
        AssetStatus::Available,
    ];

    /// ステータスを文字列に変換
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Operational => "operational",
            Self::UnderRepair => "under-repair",
            Self::Obsolete => "obsolete",
            Self::Retired => "retired",
            Self::Available => "available",
        }
    }

    /// 文字列からステータスに変換（完全一致のみ）
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "operational" => Some(Self::Operational),
            "under-repair" => Some(Self::UnderRepair),
            "obsolete" => Some(Self::Obsolete),
            "retired" => Some(Self::Retired),
            "available" => Some(Self::Available),
            _ => None,
        }
    }
}

impl fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 資産
///
/// `category_id`/`employee_id`は論理削除済みの資産で所有者が削除された場合のみNoneになる。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    /// 資産ID
    pub id: i64,
    /// 資産管理番号（一意）
    pub inventory_code: String,
    /// カテゴリID
    pub category_id: Option<i64>,
    /// 割り当て先の従業員ID
    pub employee_id: Option<i64>,
    /// メーカー
    pub brand: String,
    /// 型番
    pub model: String,
    /// シリアル番号（任意、一意）
    pub serial_number: Option<String>,
    /// ステータス
    pub status: AssetStatus,
    /// 仕様
    pub specifications: Specifications,
    /// 備考
    pub comments: Option<String>,
    /// 作成日時
    pub created_at: DateTime<Utc>,
    /// 更新日時
    pub updated_at: DateTime<Utc>,
    /// 論理削除日時
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// 関連付きの資産（一覧・詳細レスポンス用）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetDetails {
    /// 資産本体
    #[serde(flatten)]
    pub asset: Asset,
    /// カテゴリ
    pub category: Option<Category>,
    /// 割り当て先の従業員（所属部署付き）
    pub employee: Option<EmployeeDetails>,
}
