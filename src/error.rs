/*
 * Responsibility
 * - 起動時 (設定読み込み / bind / serve) のエラー定義
 * - check 自体はエラーを返さない (全て Deny に変換される) ので HTTP へのマッピングは持たない
 */
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}
