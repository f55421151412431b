//! リクエスト抽出器
//!
//! axum標準の`Json`は不正なボディをプレーンテキストで拒否するため、
//! 共通のJSONエラー形式（422）に変換するラッパーを使う。

use crate::api::error::AppError;
use crate::common::error::{FieldErrors, InventoryError};
use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

/// JSONボディ抽出器（拒否時は検証エラー）
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(rejection_to_error(rejection).into()),
        }
    }
}

fn rejection_to_error(rejection: JsonRejection) -> InventoryError {
    let message = match &rejection {
        JsonRejection::MissingJsonContentType(_) => {
            "The request body must be sent as application/json.".to_string()
        }
        JsonRejection::JsonSyntaxError(_) => "The request body is not valid JSON.".to_string(),
        JsonRejection::JsonDataError(err) => err.body_text(),
        other => other.body_text(),
    };
    tracing::debug!("JSON body rejected: {}", rejection.body_text());
    InventoryError::Validation(FieldErrors::single("body", message))
}
