//! ダッシュボードAPI

use super::error::ApiResult;
use crate::db::dashboard::{self, DashboardSummary};
use crate::AppState;
use axum::{extract::State, Json};

/// GET /dashboard/summary - 集計サマリー
///
/// 有効な資産数・従業員数・部署数、ステータス別の資産数、最近登録された資産5件
pub async fn get_summary(State(app_state): State<AppState>) -> ApiResult<Json<DashboardSummary>> {
    let summary = dashboard::summary(&app_state.db_pool).await?;
    Ok(Json(summary))
}
