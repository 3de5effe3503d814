/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - checker: 設定から組み立てた AuthzChecker (不変、Arc で共有)
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::services::authz::AuthzChecker;

#[derive(Clone, Debug)]
pub struct AppState {
    pub checker: Arc<AuthzChecker>,
    pub check_path_prefix: Arc<str>,
}

impl AppState {
    pub fn new(checker: Arc<AuthzChecker>, check_path_prefix: &str) -> Self {
        Self {
            checker,
            check_path_prefix: Arc::from(check_path_prefix),
        }
    }
}
