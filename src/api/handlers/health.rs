/*
 * Responsibility
 * - GET /health (疎通用)
 * - check prefix の外に置く (proxy から転送されてくる request と衝突させない)
 */
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}
