//! ロギング初期化ユーティリティ
//!
//! `INVENTORY_LOG_LEVEL`（未設定なら`RUST_LOG`、どちらも無ければ`info`）で
//! フィルタを決め、コンソールへ出力する。`INVENTORY_LOG_DIR`が設定されていれば
//! 日次ローテーションのファイル出力も追加する。

use crate::common::error::CommonError;
use std::path::PathBuf;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// ログファイル名の接頭辞
const LOG_FILE_PREFIX: &str = "asset-inventory.log";
/// 既定のログレベル
const DEFAULT_LOG_LEVEL: &str = "info";

/// ロギング設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// EnvFilter構文のフィルタ
    pub filter: String,
    /// ファイル出力先ディレクトリ
    pub log_dir: Option<PathBuf>,
}

impl LoggingConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Self {
        let filter = std::env::var("INVENTORY_LOG_LEVEL")
            .or_else(|_| std::env::var("RUST_LOG"))
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
        let log_dir = std::env::var("INVENTORY_LOG_DIR")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);
        Self { filter, log_dir }
    }
}

/// グローバルsubscriberを初期化する
pub fn init() -> Result<(), CommonError> {
    let config = LoggingConfig::from_env();
    let env_filter = EnvFilter::try_new(&config.filter)
        .map_err(|e| CommonError::Config(format!("Invalid log filter '{}': {}", config.filter, e)))?;

    let console_layer = fmt::layer().with_target(true).with_filter(env_filter.clone());
    let subscriber = tracing_subscriber::registry().with(console_layer);

    match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(|e| {
                CommonError::Config(format!(
                    "Failed to create log directory {}: {}",
                    dir.display(),
                    e
                ))
            })?;
            let file_appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let file_layer = fmt::layer()
                .with_writer(file_appender)
                .with_target(true)
                .with_ansi(false)
                .with_filter(env_filter);
            subscriber
                .with(file_layer)
                .try_init()
                .map_err(|e| CommonError::Config(format!("Failed to initialize logging: {}", e)))
        }
        None => subscriber
            .try_init()
            .map_err(|e| CommonError::Config(format!("Failed to initialize logging: {}", e))),
    }
}
