//! JWT秘密鍵管理
//!
//! `INVENTORY_JWT_SECRET`（旧: `JWT_SECRET`）が設定されていればそれを使い、
//! 未設定ならデータディレクトリの`jwt_secret`ファイルを読み込む。
//! ファイルも無ければ生成して保存し、再起動後も同じ鍵を使う。

use crate::auth::generate_random_token;
use crate::common::error::CommonError;
use crate::config::{data_dir, get_env_with_fallback};
use std::fs;
use std::path::Path;

/// 秘密鍵ファイル名
const SECRET_FILE_NAME: &str = "jwt_secret";
/// 生成する秘密鍵の長さ
const SECRET_LENGTH: usize = 64;

/// JWT秘密鍵を取得（環境変数 → ファイル → 生成）
pub fn get_or_create_jwt_secret() -> Result<String, CommonError> {
    if let Some(secret) = get_env_with_fallback("INVENTORY_JWT_SECRET", "JWT_SECRET") {
        if !secret.trim().is_empty() {
            tracing::info!("Using JWT secret from environment");
            return Ok(secret);
        }
    }
    load_or_create_secret_file(&data_dir().join(SECRET_FILE_NAME))
}

/// 秘密鍵ファイルを読み込む。存在しない・空の場合は生成して保存する
pub fn load_or_create_secret_file(path: &Path) -> Result<String, CommonError> {
    if path.exists() {
        let secret = fs::read_to_string(path).map_err(|e| {
            CommonError::Config(format!(
                "Failed to read JWT secret file {}: {}",
                path.display(),
                e
            ))
        })?;
        let secret = secret.trim().to_string();
        if !secret.is_empty() {
            tracing::debug!("Loaded JWT secret from {}", path.display());
            return Ok(secret);
        }
        tracing::warn!("JWT secret file {} is empty, regenerating", path.display());
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            CommonError::Config(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    let secret = generate_random_token(SECRET_LENGTH);
    fs::write(path, &secret).map_err(|e| {
        CommonError::Config(format!(
            "Failed to write JWT secret file {}: {}",
            path.display(),
            e
        ))
    })?;
    restrict_permissions(path)?;
    tracing::info!("Generated new JWT secret at {}", path.display());
    Ok(secret)
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<(), CommonError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(|e| {
        CommonError::Config(format!(
            "Failed to set permissions on {}: {}",
            path.display(),
            e
        ))
    })
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<(), CommonError> {
    Ok(())
}
