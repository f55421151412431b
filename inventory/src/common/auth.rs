// 認証関連のデータモデル

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// ユーザーロール
///
/// 文字列表現は完全一致でのみ解釈し、未知の値はロールとして扱わない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UserRole {
    /// 管理者（全操作可能）
    Admin,
    /// 部門長（参照のみ）
    DepartmentHead,
    /// 監査担当（参照 + 監査ログ閲覧）
    Auditor,
}

impl UserRole {
    /// すべてのロール
    pub const ALL: [UserRole; 3] = [UserRole::Admin, UserRole::DepartmentHead, UserRole::Auditor];

    /// ロールを文字列に変換
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::DepartmentHead => "department-head",
            Self::Auditor => "auditor",
        }
    }

    /// 文字列からロールに変換（完全一致のみ）
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Self::Admin),
            "department-head" => Some(Self::DepartmentHead),
            "auditor" => Some(Self::Auditor),
            _ => None,
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 未知のロール文字列
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role: {}", self.0)
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for UserRole {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| UnknownRole(s.to_string()))
    }
}

/// ユーザー
///
/// パスワードハッシュを含むためシリアライズしない。レスポンスには`UserProfile`を使う。
#[derive(Debug, Clone)]
pub struct User {
    /// ユーザーID
    pub id: i64,
    /// 表示名
    pub name: String,
    /// メールアドレス（ログインID）
    pub email: String,
    /// パスワードハッシュ（bcrypt）
    pub password_hash: String,
    /// ユーザーロール（未知の値はNone）
    pub role: Option<UserRole>,
    /// ストレージ上のロール文字列
    pub raw_role: String,
    /// 有効フラグ
    pub is_active: bool,
    /// 作成日時
    pub created_at: DateTime<Utc>,
    /// 更新日時
    pub updated_at: DateTime<Utc>,
}

/// 公開プロフィール（password_hash除外）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// ユーザーID
    pub id: i64,
    /// 表示名
    pub name: String,
    /// メールアドレス
    pub email: String,
    /// ロール
    pub role: String,
    /// 有効フラグ
    pub is_active: bool,
    /// 作成日時
    pub created_at: DateTime<Utc>,
    /// 更新日時
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        UserProfile {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.raw_role,
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// JWTクレーム
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// ユーザーID（JWT sub claim）
    pub sub: String,
    /// 発行時点のユーザーロール
    pub role: UserRole,
    /// 有効期限（Unix timestamp、JWT exp claim）
    pub exp: usize,
}

/// 認証済みの操作主体
///
/// アクセス制御ミドルウェアがリクエスト拡張に格納し、
/// ハンドラーは監査ログのアクターとして利用する。
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// ユーザーID
    pub id: i64,
    /// 表示名
    pub name: String,
    /// メールアドレス
    pub email: String,
    /// ロール
    pub role: UserRole,
    /// クライアントIPアドレス
    pub ip_address: Option<String>,
}
