/*
 * Responsibility
 * - URL 構造を定義
 * - /health と、check prefix 以下の全 method / 全 path を check handler へ
 */
use axum::{
    Router,
    routing::{any, get},
};

use crate::api::handlers::{check::check, health::health};
use crate::state::AppState;

/// Envoy (http_service + path_prefix) sends `<prefix><original path>`, so the
/// bare prefix, `<prefix>/` and everything below it are all checked.
pub fn routes(state: AppState) -> Router {
    let prefix = state.check_path_prefix.to_string();

    Router::new()
        .route("/health", get(health))
        .route(&prefix, any(check))
        .route(&format!("{prefix}/"), any(check))
        .route(&format!("{prefix}/{{*path}}"), any(check))
        .with_state(state)
}
