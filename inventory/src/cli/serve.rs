//! serve サブコマンド
//!
//! 在庫管理サーバーを起動します。

use clap::Args;

/// serve サブコマンドの引数
#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Listen port
    #[arg(short, long, default_value = "8000", env = "INVENTORY_PORT")]
    pub port: u16,

    /// Bind address
    #[arg(short = 'H', long, default_value = "0.0.0.0", env = "INVENTORY_HOST")]
    pub host: String,
}

impl ServeArgs {
    /// 環境変数のみから引数を組み立てる（サブコマンド省略時）
    pub fn from_env() -> Self {
        Self {
            port: crate::config::server_port(),
            host: crate::config::server_host(),
        }
    }

    /// 待ち受けアドレス
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
