//! 入力検証ヘルパー
//!
//! リクエストボディの各フィールドを検証し、`FieldErrors`に
//! フィールド単位のメッセージを蓄積する。

use crate::common::error::FieldErrors;
use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s.]+$").expect("valid regex"));

/// 必須の文字列フィールドを検証し、前後空白を除いた値を返す
///
/// 欠落・空文字・最大長超過の場合はエラーを追加して`None`を返す。
pub fn required_string(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&str>,
    max: Option<usize>,
) -> Option<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => check_max(errors, field, v, max),
        _ => {
            errors.add(field, format!("The {} field is required.", field));
            None
        }
    }
}

/// 任意の文字列フィールドを検証する
///
/// 空文字は未指定として扱う。
pub fn optional_string(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&str>,
    max: Option<usize>,
) -> Option<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => check_max(errors, field, v, max),
        _ => None,
    }
}

fn check_max(errors: &mut FieldErrors, field: &str, value: &str, max: Option<usize>) -> Option<String> {
    if let Some(max) = max {
        if value.chars().count() > max {
            errors.add(
                field,
                format!("The {} may not be greater than {} characters.", field, max),
            );
            return None;
        }
    }
    Some(value.to_string())
}

/// メールアドレス形式か判定
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_PATTERN.is_match(value)
}

/// 必須のメールアドレスを検証する
pub fn required_email(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&str>,
    max: Option<usize>,
) -> Option<String> {
    let email = required_string(errors, field, value, max)?;
    email_format(errors, field, email)
}

/// 任意のメールアドレスを検証する
pub fn optional_email(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&str>,
    max: Option<usize>,
) -> Option<String> {
    let email = optional_string(errors, field, value, max)?;
    email_format(errors, field, email)
}

fn email_format(errors: &mut FieldErrors, field: &str, email: String) -> Option<String> {
    if is_valid_email(&email) {
        Some(email)
    } else {
        errors.add(
            field,
            format!("The {} must be a valid email address.", field),
        );
        None
    }
}

/// 必須の参照IDを検証する（存在確認は呼び出し側でDBに問い合わせる）
pub fn required_id(errors: &mut FieldErrors, field: &str, value: Option<i64>) -> Option<i64> {
    match value {
        Some(id) => Some(id),
        None => {
            errors.add(field, format!("The {} field is required.", field));
            None
        }
    }
}

/// 最小長を検証する
pub fn min_length(errors: &mut FieldErrors, field: &str, value: &str, min: usize) -> bool {
    if value.chars().count() < min {
        errors.add(
            field,
            format!("The {} must be at least {} characters.", field, min),
        );
        return false;
    }
    true
}

/// 列挙値を解析する。未知の値はエラーを追加して`None`を返す
pub fn enum_value<T>(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&str>,
    required: bool,
    parse: impl Fn(&str) -> Option<T>,
) -> Option<T> {
    match value {
        Some(raw) => {
            let parsed = parse(raw);
            if parsed.is_none() {
                errors.add(field, format!("The selected {} is invalid.", field));
            }
            parsed
        }
        None => {
            if required {
                errors.add(field, format!("The {} field is required.", field));
            }
            None
        }
    }
}

/// 参照先が存在しない場合のエラーを追加
pub fn invalid_reference(errors: &mut FieldErrors, field: &str) {
    errors.add(field, format!("The selected {} is invalid.", field));
}

/// 一意制約違反のエラーを追加
pub fn already_taken(errors: &mut FieldErrors, field: &str) {
    errors.add(field, format!("The {} has already been taken.", field));
}
