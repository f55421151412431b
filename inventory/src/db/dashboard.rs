//! ダッシュボード集計

use super::{assets, departments, employees};
use crate::common::error::InventoryError;
use crate::types::{AssetDetails, AssetStatus};
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::BTreeMap;

/// 最近登録された資産の表示件数
pub const RECENT_ASSETS_LIMIT: i64 = 5;

/// ダッシュボードのサマリー
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    /// 有効な資産数
    pub total_assets: i64,
    /// 従業員数
    pub total_employees: i64,
    /// 部署数
    pub total_departments: i64,
    /// ステータス別の有効な資産数（全ステータスを含む）
    pub assets_by_status: BTreeMap<&'static str, i64>,
    /// 最近登録された有効な資産
    pub recent_assets: Vec<AssetDetails>,
}

/// サマリーを集計
pub async fn summary(pool: &SqlitePool) -> Result<DashboardSummary, InventoryError> {
    let total_assets = assets::count_live(pool).await?;
    let total_employees = employees::count(pool).await?;
    let total_departments = departments::count(pool).await?;
    let assets_by_status = assets::count_by_status(pool)
        .await?
        .into_iter()
        .map(|(status, count): (AssetStatus, i64)| (status.as_str(), count))
        .collect();
    let recent_assets = assets::recent(pool, RECENT_ASSETS_LIMIT).await?;

    Ok(DashboardSummary {
        total_assets,
        total_employees,
        total_departments,
        assets_by_status,
        recent_assets,
    })
}
