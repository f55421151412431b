//! データベースアクセス層
//!
//! SQLiteベースのデータ永続化。読み取りは`&SqlitePool`、
//! 書き込みはトランザクション上の`&mut SqliteConnection`を受け取る。

use crate::common::error::{FieldErrors, InventoryError};
use chrono::{DateTime, SecondsFormat, Utc};

/// ユーザー管理
pub mod users;

/// 部署
pub mod departments;

/// 従業員
pub mod employees;

/// カテゴリ
pub mod categories;

/// 資産（論理削除）
pub mod assets;

/// 監査ログストレージ
pub mod audit_log;

/// 削除前の参照整合性チェック
pub mod integrity;

/// ダッシュボード集計
pub mod dashboard;

/// SQLite拡張エラーコード: SQLITE_CONSTRAINT_FOREIGNKEY
const SQLITE_CONSTRAINT_FOREIGNKEY: &str = "787";
/// SQLite拡張エラーコード: SQLITE_CONSTRAINT_TRIGGER
const SQLITE_CONSTRAINT_TRIGGER: &str = "1811";

/// 現在時刻を保存用の文字列に変換（RFC 3339、マイクロ秒、UTC）
pub(crate) fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// 保存済みの時刻文字列を解析
pub(crate) fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, InventoryError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| InventoryError::Database(format!("Invalid timestamp '{}': {}", value, e)))
}

/// 任意の時刻文字列を解析
pub(crate) fn parse_optional_timestamp(
    value: Option<&str>,
) -> Result<Option<DateTime<Utc>>, InventoryError> {
    value.map(parse_timestamp).transpose()
}

/// 大文字小文字を区別しない部分一致検索
///
/// SQLiteの`LIKE`はASCII以外の大文字小文字を同一視しないため、
/// 一覧の絞り込みはUnicodeの小文字化で比較する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TextSearch(String);

impl TextSearch {
    /// 検索語を作成（前後空白は呼び出し側で除去済み）
    pub(crate) fn new(search: &str) -> Self {
        Self(search.to_lowercase())
    }

    /// いずれかのフィールドが検索語を含むか
    pub(crate) fn matches(&self, fields: &[Option<&str>]) -> bool {
        fields
            .iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&self.0))
    }

    /// 大文字小文字を無視して完全一致するか
    pub(crate) fn equals(&self, field: &str) -> bool {
        field.to_lowercase() == self.0
    }
}

/// 一意制約違反であれば違反した列名を返す
pub(crate) fn unique_violation_column(err: &sqlx::Error) -> Option<String> {
    let db_err = err.as_database_error()?;
    if !db_err.is_unique_violation() {
        return None;
    }
    // "UNIQUE constraint failed: departments.name"
    let message = db_err.message();
    let column = message
        .rsplit(": ")
        .next()
        .and_then(|target| target.split(',').next())
        .and_then(|qualified| qualified.trim().rsplit('.').next())
        .unwrap_or("id");
    Some(column.to_string())
}

/// 外部キーまたは整合性トリガーによる拒否か
pub(crate) fn is_integrity_violation(err: &sqlx::Error) -> bool {
    match err.as_database_error() {
        Some(db_err) => {
            db_err.is_foreign_key_violation()
                || matches!(
                    db_err.code().as_deref(),
                    Some(SQLITE_CONSTRAINT_FOREIGNKEY) | Some(SQLITE_CONSTRAINT_TRIGGER)
                )
        }
        None => false,
    }
}

/// 書き込み時のsqlxエラーをドメインエラーに変換
///
/// 事前検証をすり抜けた一意制約違反は該当フィールドの検証エラー、
/// 参照整合性の拒否は`Conflict`として扱う。
pub(crate) fn map_write_error(err: sqlx::Error, context: &str) -> InventoryError {
    if let Some(column) = unique_violation_column(&err) {
        return InventoryError::Validation(FieldErrors::single(
            &column,
            format!("The {} has already been taken.", column),
        ));
    }
    if is_integrity_violation(&err) {
        return InventoryError::Conflict(format!(
            "{}: the record is still referenced by other records",
            context
        ));
    }
    InventoryError::Database(format!("{}: {}", context, err))
}
