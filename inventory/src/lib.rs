//! Asset Inventory Server
//!
//! 部署・従業員・カテゴリ・資産を管理するHTTP/JSONバックエンド。
//! ロールベースのアクセス制御、削除時の参照整合性チェック、追記専用の監査ログを備える。

#![warn(missing_docs)]

/// 共通型定義（認証・エラー・入力検証）
pub mod common;

/// REST APIハンドラー
pub mod api;

/// 監査ログ
pub mod audit;

/// 認証・認可機能
pub mod auth;

/// サーバー初期化
pub mod bootstrap;

/// CLIインターフェース
pub mod cli;

/// 設定管理（環境変数ヘルパー）
pub mod config;

/// データベースアクセス
pub mod db;

/// JWT秘密鍵管理
pub mod jwt_secret;

/// ロギング初期化ユーティリティ
pub mod logging;

/// axumサーバー起動
pub mod server;

/// 在庫エンティティの型定義
pub mod types;

/// アプリケーション状態
#[derive(Clone)]
pub struct AppState {
    /// データベース接続プール
    pub db_pool: sqlx::SqlitePool,
    /// JWT秘密鍵
    pub jwt_secret: String,
}
