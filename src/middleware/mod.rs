/*
 * Responsibility
 * - middleware の公開インターフェース
 */
pub mod http;
