//! Configuration management via environment variables
//!
//! Provides helper functions for reading environment variables with fallback
//! to deprecated variable names with warning logs.

use std::path::PathBuf;

/// デフォルトの待ち受けアドレス
pub const DEFAULT_HOST: &str = "0.0.0.0";
/// デフォルトの待ち受けポート
pub const DEFAULT_PORT: u16 = 8000;
/// データディレクトリ名（ホームディレクトリ直下）
const DEFAULT_DATA_DIR_NAME: &str = ".asset-inventory";
/// SQLiteファイル名
const DATABASE_FILE_NAME: &str = "inventory.db";

/// Get an environment variable with fallback to a deprecated name
///
/// If the new variable name is set, returns its value.
/// If only the old (deprecated) variable name is set, returns its value
/// and logs a deprecation warning.
///
/// # Arguments
/// * `new_name` - The new environment variable name (preferred)
/// * `old_name` - The deprecated environment variable name (fallback)
///
/// # Returns
/// * `Some(value)` - The environment variable value
/// * `None` - Neither variable is set
///
/// # Example
/// ```
/// use asset_inventory::config::get_env_with_fallback;
///
/// let secret = get_env_with_fallback("INVENTORY_JWT_SECRET", "JWT_SECRET");
/// ```
pub fn get_env_with_fallback(new_name: &str, old_name: &str) -> Option<String> {
    if let Ok(val) = std::env::var(new_name) {
        return Some(val);
    }
    if let Ok(val) = std::env::var(old_name) {
        tracing::warn!(
            "Environment variable '{}' is deprecated, use '{}' instead",
            old_name,
            new_name
        );
        return Some(val);
    }
    None
}

/// Get an environment variable with fallback and default value
///
/// Similar to `get_env_with_fallback`, but returns a default value
/// if neither variable is set.
pub fn get_env_with_fallback_or(new_name: &str, old_name: &str, default: &str) -> String {
    get_env_with_fallback(new_name, old_name).unwrap_or_else(|| default.to_string())
}

/// Get an environment variable with fallback, parsing to a specific type
///
/// Returns `default` if neither is set or parsing fails.
pub fn get_env_with_fallback_parse<T: std::str::FromStr>(
    new_name: &str,
    old_name: &str,
    default: T,
) -> T {
    get_env_with_fallback(new_name, old_name)
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// データディレクトリを取得
///
/// `INVENTORY_DATA_DIR` が未設定の場合は `~/.asset-inventory` を使用する。
/// ホームディレクトリも不明な場合はカレントディレクトリ配下に作成する。
pub fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("INVENTORY_DATA_DIR") {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }
    match std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE")) {
        Ok(home) => PathBuf::from(home).join(DEFAULT_DATA_DIR_NAME),
        Err(_) => PathBuf::from(DEFAULT_DATA_DIR_NAME),
    }
}

/// データベース接続URLを取得
///
/// `INVENTORY_DATABASE_URL`（旧: `DATABASE_URL`）、未設定なら
/// `sqlite:{data_dir}/inventory.db`。
pub fn database_url() -> String {
    get_env_with_fallback("INVENTORY_DATABASE_URL", "DATABASE_URL").unwrap_or_else(|| {
        format!(
            "sqlite:{}",
            data_dir().join(DATABASE_FILE_NAME).display()
        )
    })
}

/// HTTPサーバーの待ち受けアドレス
pub fn server_host() -> String {
    get_env_with_fallback_or("INVENTORY_HOST", "INVENTORY_HOST", DEFAULT_HOST)
}

/// HTTPサーバーの待ち受けポート
pub fn server_port() -> u16 {
    get_env_with_fallback_parse("INVENTORY_PORT", "INVENTORY_PORT", DEFAULT_PORT)
}
