//! APIエラーレスポンス型
//!
//! axum用の共通エラーハンドリング

use crate::common::error::InventoryError;
use axum::{response::IntoResponse, Json};
use serde_json::json;

/// Axum用のエラーレスポンス型
#[derive(Debug)]
pub struct AppError(pub InventoryError);

impl From<InventoryError> for AppError {
    fn from(err: InventoryError) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.0.status_code();

        // 内部の詳細はログにのみ残し、応答には external_message() を使う
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        } else {
            tracing::debug!("Request rejected: {}", self.0);
        }

        let payload = match &self.0 {
            InventoryError::Validation(errors) => json!({
                "error": self.0.error_type(),
                "message": self.0.external_message(),
                "errors": errors,
            }),
            _ => json!({
                "error": self.0.error_type(),
                "message": self.0.external_message(),
            }),
        };

        (status, Json(payload)).into_response()
    }
}

/// ハンドラーの戻り値型
pub type ApiResult<T> = Result<T, AppError>;
