//! エラー型定義
//!
//! 統一エラー型（thiserror使用）
//!
//! `InventoryError`は`error_type()`と`status_code()`メソッドを提供し、
//! APIレスポンスへの変換は`api::error::AppError`が担う。

use axum::http::StatusCode;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Common layer error type
#[derive(Debug, Error)]
pub enum CommonError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// フィールド単位の検証エラー
///
/// フィールド名 → メッセージ一覧。JSONでは `{"email": ["..."]}` の形になる。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// 空のエラー集合を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 単一フィールドのエラーを作成
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// フィールドにメッセージを追加
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// エラーが無いか
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 指定フィールドにエラーがあるか
    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// 指定フィールドのメッセージ一覧
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// エラーが1件でもあれば`InventoryError::Validation`に変換する
    pub fn into_result(self) -> Result<(), InventoryError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(InventoryError::Validation(self))
        }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{}: {}", field, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// asset inventory error type
#[derive(Debug, Error)]
pub enum InventoryError {
    /// Common layer error
    #[error(transparent)]
    Common(#[from] CommonError),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Field-level validation failure
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Password hash error
    #[error("Password hash error: {0}")]
    PasswordHash(String),

    /// JWT issuance error
    #[error("JWT error: {0}")]
    Jwt(String),

    /// Missing, malformed, or expired credential
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Wrong email or password at login
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Valid credential for a deactivated account
    #[error("Account inactive")]
    AccountInactive,

    /// Authorization error
    #[error("Authorization error: {0}")]
    Authorization(String),

    /// Conflict error (referential integrity)
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl InventoryError {
    /// Returns a safe error message for external clients.
    ///
    /// Storage and internal failures collapse into a generic message; domain
    /// errors (not found, conflict, authorization) carry their own text because
    /// it contains nothing beyond what the caller already sent.
    pub fn external_message(&self) -> String {
        match self {
            Self::Common(_) => "Request error".to_string(),
            Self::NotFound(message) => message.clone(),
            Self::Validation(_) => "The given data was invalid".to_string(),
            Self::Database(_) => "Database error".to_string(),
            Self::Internal(_) => "Internal server error".to_string(),
            Self::PasswordHash(_) => "Internal server error".to_string(),
            Self::Jwt(_) => "Internal server error".to_string(),
            Self::Authentication(_) => "Unauthenticated".to_string(),
            Self::InvalidCredentials => "Invalid email or password".to_string(),
            Self::AccountInactive => {
                "This account has been deactivated. Contact an administrator.".to_string()
            }
            Self::Authorization(message) => message.clone(),
            Self::Conflict(message) => message.clone(),
        }
    }

    /// Returns the error kind string used in the `error` field of responses.
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Common(_) => "Bad request",
            Self::NotFound(_) => "Not found",
            Self::Validation(_) => "Validation failed",
            Self::Database(_) => "Server error",
            Self::Internal(_) => "Server error",
            Self::PasswordHash(_) => "Server error",
            Self::Jwt(_) => "Server error",
            Self::Authentication(_) => "Unauthenticated",
            Self::InvalidCredentials => "Unauthorized",
            Self::AccountInactive => "Account inactive",
            Self::Authorization(_) => "Forbidden",
            Self::Conflict(_) => "Cannot delete",
        }
    }

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Common(CommonError::Serialization(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Common(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::PasswordHash(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Jwt(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Authentication(_) => StatusCode::UNAUTHORIZED,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::AccountInactive => StatusCode::FORBIDDEN,
            Self::Authorization(_) => StatusCode::FORBIDDEN,
            Self::Conflict(_) => StatusCode::CONFLICT,
        }
    }
}

/// Result type alias (Common)
pub type CommonResult<T> = Result<T, CommonError>;

/// Result type alias (inventory)
pub type InventoryResult<T> = Result<T, InventoryError>;
