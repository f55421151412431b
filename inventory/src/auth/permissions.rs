//! ロール別アクセス許可テーブル
//!
//! 認証が必要な全ルートの許可ロールをここに列挙する。
//! テーブルに無いルート、未知のロール、許可セット外のロールはすべて拒否される。

use crate::common::auth::UserRole;
use crate::common::error::InventoryError;

const ALL_ROLES: &[UserRole] = &[UserRole::Admin, UserRole::DepartmentHead, UserRole::Auditor];
const ADMIN_ONLY: &[UserRole] = &[UserRole::Admin];
const ADMIN_AND_AUDITOR: &[UserRole] = &[UserRole::Admin, UserRole::Auditor];

/// 1ルート・1メソッド分の許可ルール
#[derive(Debug, Clone, Copy)]
pub struct AccessRule {
    /// HTTPメソッド
    pub method: &'static str,
    /// axumのルートパターン（例: `/assets/{id}`）
    pub route: &'static str,
    /// 許可されたロール
    pub allowed: &'static [UserRole],
}

const fn rule(
    method: &'static str,
    route: &'static str,
    allowed: &'static [UserRole],
) -> AccessRule {
    AccessRule {
        method,
        route,
        allowed,
    }
}

/// アクセス許可テーブル
pub const ACCESS_RULES: &[AccessRule] = &[
    // セッション
    rule("GET", "/me", ALL_ROLES),
    rule("POST", "/logout", ALL_ROLES),
    rule("POST", "/refresh", ALL_ROLES),
    // 部署
    rule("GET", "/departments", ALL_ROLES),
    rule("GET", "/departments/{id}", ALL_ROLES),
    rule("POST", "/departments", ADMIN_ONLY),
    rule("PUT", "/departments/{id}", ADMIN_ONLY),
    rule("DELETE", "/departments/{id}", ADMIN_ONLY),
    // 従業員
    rule("GET", "/employees", ALL_ROLES),
    rule("GET", "/employees/{id}", ALL_ROLES),
    rule("POST", "/employees", ADMIN_ONLY),
    rule("PUT", "/employees/{id}", ADMIN_ONLY),
    rule("DELETE", "/employees/{id}", ADMIN_ONLY),
    // カテゴリ
    rule("GET", "/categories", ALL_ROLES),
    rule("GET", "/categories/{id}", ALL_ROLES),
    rule("POST", "/categories", ADMIN_ONLY),
    rule("PUT", "/categories/{id}", ADMIN_ONLY),
    rule("DELETE", "/categories/{id}", ADMIN_ONLY),
    // 資産
    rule("GET", "/assets", ALL_ROLES),
    rule("GET", "/assets/{id}", ALL_ROLES),
    rule("POST", "/assets", ADMIN_ONLY),
    rule("PUT", "/assets/{id}", ADMIN_ONLY),
    rule("DELETE", "/assets/{id}", ADMIN_ONLY),
    // ダッシュボード・監査ログ
    rule("GET", "/dashboard/summary", ALL_ROLES),
    rule("GET", "/audit-logs", ADMIN_AND_AUDITOR),
    // ユーザー管理
    rule("GET", "/users", ADMIN_ONLY),
    rule("GET", "/users/{id}", ADMIN_ONLY),
    rule("POST", "/users", ADMIN_ONLY),
    rule("PUT", "/users/{id}", ADMIN_ONLY),
    rule("DELETE", "/users/{id}", ADMIN_ONLY),
];

/// ルートとメソッドに対応する許可ルールを検索
pub fn find_rule(method: &str, route: &str) -> Option<&'static AccessRule> {
    ACCESS_RULES
        .iter()
        .find(|rule| rule.method.eq_ignore_ascii_case(method) && rule.route == route)
}

/// アクセス可否を判定する唯一のゲート
///
/// # Arguments
/// * `method` - HTTPメソッド
/// * `route` - マッチしたルートパターン
/// * `role` - 呼び出し元のロール（未知のロールはNone）
///
/// # Returns
/// * `Ok(())` - 許可
/// * `Err(InventoryError::Authorization)` - 拒否
pub fn authorize(method: &str, route: &str, role: Option<UserRole>) -> Result<(), InventoryError> {
    let Some(role) = role else {
        return Err(InventoryError::Authorization(
            "Your role is not recognized".to_string(),
        ));
    };

    match find_rule(method, route) {
        Some(rule) if rule.allowed.contains(&role) => Ok(()),
        Some(_) => Err(InventoryError::Authorization(format!(
            "The '{}' role is not allowed to {} {}",
            role, method, route
        ))),
        None => Err(InventoryError::Authorization(format!(
            "No access rule for {} {}",
            method, route
        ))),
    }
}
