/*
 * Responsibility
 * - 環境変数や設定の読み込み (PORT, REQUEST_LOGGING, JWT 検証設定など)
 * - 設定値のバリデーション (不正なら起動失敗)
 *
 * Notes
 * - JWT_RSA_PUBLIC_KEY が無い / 壊れている場合は起動失敗にしない。
 *   checker 側で 503 (INTERNAL) として扱う。
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    pub request_logging: bool,

    pub jwt_rsa_public_key: String,
    pub jwt_leeway_seconds: u64,
    pub jwt_issuer: Option<String>,
    pub jwt_audience: Option<String>,

    // Envoy http_service.path_prefix
    pub check_path_prefix: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("request_logging", &self.request_logging)
            .field("jwt_rsa_public_key_set", &!self.jwt_rsa_public_key.is_empty())
            .field("jwt_leeway_seconds", &self.jwt_leeway_seconds)
            .field("jwt_issuer", &self.jwt_issuer)
            .field("jwt_audience", &self.jwt_audience)
            .field("check_path_prefix", &self.check_path_prefix)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (env in production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = match lookup("PORT") {
            Some(s) => s.trim().parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 3000,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = lookup("APP_ENV")
            .map(|v| AppEnv::parse(&v))
            .unwrap_or(AppEnv::Development);

        let request_logging = match lookup("REQUEST_LOGGING") {
            Some(v) => parse_bool(&v).ok_or(ConfigError::Invalid("REQUEST_LOGGING"))?,
            None => false,
        };

        let jwt_rsa_public_key = lookup("JWT_RSA_PUBLIC_KEY")
            .unwrap_or_default()
            .replace("\\n", "\n");

        let jwt_leeway_seconds = match lookup("JWT_LEEWAY_SECONDS") {
            Some(v) => v
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::Invalid("JWT_LEEWAY_SECONDS"))?,
            None => 0,
        };

        let jwt_issuer = lookup("JWT_ISSUER")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let jwt_audience = lookup("JWT_AUDIENCE")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let check_path_prefix = lookup("CHECK_PATH_PREFIX")
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|| "/check".to_string());

        // Must stay disjoint from /health, and "{prefix}/{*path}" must be a valid route.
        if !check_path_prefix.starts_with('/')
            || check_path_prefix.len() < 2
            || check_path_prefix.ends_with('/')
            || check_path_prefix.contains(['{', '}'])
            || check_path_prefix == "/health"
        {
            return Err(ConfigError::Invalid("CHECK_PATH_PREFIX"));
        }

        Ok(Self {
            addr,
            app_env,
            request_logging,
            jwt_rsa_public_key,
            jwt_leeway_seconds,
            jwt_issuer,
            jwt_audience,
            check_path_prefix,
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
