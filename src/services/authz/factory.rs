/// Factory: build `AuthzChecker` from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::services::authz::{AuthzChecker, CheckerConfig};

pub fn build_checker(config: &Config) -> Arc<AuthzChecker> {
    let checker = AuthzChecker::new(&CheckerConfig {
        request_logging: config.request_logging,
        jwt_rsa_public_key: config.jwt_rsa_public_key.clone(),
        leeway_seconds: config.jwt_leeway_seconds,
        issuer: config.jwt_issuer.clone(),
        audience: config.jwt_audience.clone(),
    });

    Arc::new(checker)
}
