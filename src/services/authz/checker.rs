//! Bearer-token authorization check (Envoy ext_authz semantics).
//!
//! `check` is a linear pipeline with a single exit:
//! header → scheme → key → verify → claims → passport.
//! Every failure becomes a Deny; nothing is surfaced as an error.

use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use tracing::{debug, info, warn};

use super::claims::Claims;
use super::decision::{CheckDecision, CheckRequest};
use super::error::{CheckError, VerifyError};

pub const AUTHORIZATION_HEADER: &str = "authorization";
pub const BEARER_PREFIX: &str = "Bearer ";
pub const PASSPORT_HEADER: &str = "x-passport";

/// RSA family only. Anything else (HS*, ES*, EdDSA, none) fails verification.
const RSA_ALGORITHMS: [Algorithm; 6] = [
    Algorithm::RS256,
    Algorithm::RS384,
    Algorithm::RS512,
    Algorithm::PS256,
    Algorithm::PS384,
    Algorithm::PS512,
];

/// Settings the checker reads on every call. Never mutated after construction.
#[derive(Debug, Clone, Default)]
pub struct CheckerConfig {
    pub request_logging: bool,
    pub jwt_rsa_public_key: String,
    pub leeway_seconds: u64,
    pub issuer: Option<String>,
    pub audience: Option<String>,
}

#[derive(Clone)]
pub struct AuthzChecker {
    request_logging: bool,
    // None when the configured PEM could not be decoded.
    decoding_key: Option<DecodingKey>,
    validation: Validation,
}

impl std::fmt::Debug for AuthzChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("AuthzChecker")
            .field("request_logging", &self.request_logging)
            .field("public_key_loaded", &self.decoding_key.is_some())
            .field("validation", &self.validation)
            .finish()
    }
}

impl AuthzChecker {
    /// A key that fails to decode does not fail construction: every request
    /// reaching the key step is denied with 503 instead.
    pub fn new(config: &CheckerConfig) -> Self {
        let decoding_key = match DecodingKey::from_rsa_pem(config.jwt_rsa_public_key.as_bytes()) {
            Ok(key) => Some(key),
            Err(e) => {
                warn!(error = %e, "failed to parse JWT RSA public key PEM; bearer requests will be denied");
                None
            }
        };

        let mut validation = Validation::new(Algorithm::RS256);
        validation.algorithms = RSA_ALGORITHMS.to_vec();
        validation.leeway = config.leeway_seconds;
        // exp / nbf are checked in Claims::validate, where null and 0 mean unset.
        validation.validate_exp = false;
        validation.validate_nbf = false;
        // Registered claims are optional unless pinned below.
        validation.required_spec_claims.clear();

        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
            validation.required_spec_claims.insert("iss".to_string());
        }

        match &config.audience {
            Some(audience) => {
                validation.set_audience(&[audience]);
                validation.required_spec_claims.insert("aud".to_string());
            }
            None => validation.validate_aud = false,
        }

        Self {
            request_logging: config.request_logging,
            decoding_key,
            validation,
        }
    }

    pub fn check(&self, req: &CheckRequest) -> CheckDecision {
        let authorization = req.header(AUTHORIZATION_HEADER);

        if self.request_logging {
            info!(
                method = %req.method,
                path = %req.path,
                token = authorization.unwrap_or_default(),
                body = %req.body,
                "[Request]"
            );
        }

        let decision = match self.evaluate(authorization) {
            Ok(passport) => CheckDecision::allow(vec![(PASSPORT_HEADER.to_string(), passport)]),
            Err(err) => {
                match &err {
                    CheckError::InvalidPublicKey | CheckError::ClaimsEncoding(_) => {
                        warn!(error = %err, "authorization check misconfigured")
                    }
                    _ => debug!(error = %err, "authorization check denied"),
                }
                err.into_decision()
            }
        };

        if self.request_logging {
            info!(
                status = decision.http_status().as_u16(),
                body = decision.body(),
                "[Response]"
            );
        }

        decision
    }

    /// Returns the passport (claims JSON) on success.
    fn evaluate(&self, authorization: Option<&str>) -> Result<String, CheckError> {
        let authorization = authorization.ok_or(CheckError::MissingAuthorization)?;

        let token = authorization
            .strip_prefix(BEARER_PREFIX)
            .ok_or(CheckError::InvalidTokenType)?;

        let key = self
            .decoding_key
            .as_ref()
            .ok_or(CheckError::InvalidPublicKey)?;

        let claims = self.verify(token, key)?;

        claims.to_json().map_err(CheckError::ClaimsEncoding)
    }

    // Signature, algorithm, iss/aud via jsonwebtoken; exp/nbf/iat via Claims::validate.
    fn verify(&self, token: &str, key: &DecodingKey) -> Result<Claims, VerifyError> {
        let data = jsonwebtoken::decode::<Claims>(token, key, &self.validation)?;
        let now = chrono::Utc::now().timestamp();
        data.claims.validate(now, self.validation.leeway)?;
        Ok(data.claims)
    }
}
