use serde::{Deserialize, Serialize};

/// Time-based claim failures. `iss` / `aud` are left to `jsonwebtoken::Validation`.
#[derive(Debug, thiserror::Error)]
pub enum ClaimsError {
    #[error("token is expired (exp {exp} < now {now})")]
    Expired { exp: i64, now: i64 },
    #[error("token is not valid yet (nbf {nbf} > now {now})")]
    NotYetValid { nbf: i64, now: i64 },
    #[error("token used before issued (iat {iat} > now {now})")]
    IssuedInFuture { iat: i64, now: i64 },
}

/// Registered JWT claims (RFC 7519 §4.1).
///
/// Every field is optional; absent fields are not serialized. For the time
/// claims, `null` and `0` both mean "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    #[serde(default, skip_serializing_if = "is_unset")]
    pub exp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
    #[serde(default, skip_serializing_if = "is_unset")]
    pub iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "is_unset")]
    pub nbf: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
}

impl StandardClaims {
    pub fn validate(&self, now: i64, leeway_seconds: u64) -> Result<(), ClaimsError> {
        let leeway = i64::try_from(leeway_seconds).unwrap_or(i64::MAX);

        if let Some(exp) = is_set(self.exp) {
            if exp.saturating_add(leeway) < now {
                return Err(ClaimsError::Expired { exp, now });
            }
        }
        if let Some(iat) = is_set(self.iat) {
            if iat > now.saturating_add(leeway) {
                return Err(ClaimsError::IssuedInFuture { iat, now });
            }
        }
        if let Some(nbf) = is_set(self.nbf) {
            if nbf > now.saturating_add(leeway) {
                return Err(ClaimsError::NotYetValid { nbf, now });
            }
        }
        Ok(())
    }
}

/// Verified token payload, serialized into the `x-passport` header.
///
/// The registered claims are flattened so the JSON stays a single object:
/// `{"exp":..,"iat":..,"id":42,"username":"alice"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(flatten)]
    pub standard: StandardClaims,

    #[serde(default, skip_serializing_if = "is_zero")]
    pub id: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub username: String,
}

impl Claims {
    /// Checks on top of signature verification.
    ///
    /// `id` and `username` are type-checked while deserializing; missing values
    /// fall back to zero / empty and are left out of the passport.
    pub fn validate(&self, now: i64, leeway_seconds: u64) -> Result<(), ClaimsError> {
        self.standard.validate(now, leeway_seconds)
    }

    /// Passport JSON. DEL is escaped as well, so the result is always a valid
    /// HTTP header value (serde_json leaves it raw, `HeaderValue` refuses it).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_string(self)?;
        // DEL can only occur inside a string literal here.
        Ok(json.replace('\u{7f}', "\\u007f"))
    }
}

fn is_set(v: Option<i64>) -> Option<i64> {
    v.filter(|v| *v != 0)
}

fn is_unset(v: &Option<i64>) -> bool {
    is_set(*v).is_none()
}

fn is_zero(v: &i64) -> bool {
    *v == 0
}
