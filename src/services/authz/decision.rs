/*
 * Responsibility
 * - ext_authz の入力 (CheckRequest) と出力 (CheckDecision) の型
 * - transport (axum / HeaderMap) から core へ渡す時の正規化 (header 名の小文字化)
 */
use std::collections::HashMap;

use axum::http::{HeaderMap, StatusCode};

/// google.rpc.Code values used by the check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcCode {
    Ok,
    PermissionDenied,
    Internal,
    Unauthenticated,
}

impl RpcCode {
    pub fn as_i32(self) -> i32 {
        match self {
            RpcCode::Ok => 0,
            RpcCode::PermissionDenied => 7,
            RpcCode::Internal => 13,
            RpcCode::Unauthenticated => 16,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RpcCode::Ok => "OK",
            RpcCode::PermissionDenied => "PERMISSION_DENIED",
            RpcCode::Internal => "INTERNAL",
            RpcCode::Unauthenticated => "UNAUTHENTICATED",
        }
    }
}

/// Attributes of the proxied request being authorized.
///
/// Header names are stored lower-cased, so lookups through [`CheckRequest::header`]
/// are case-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckRequest {
    pub method: String,
    pub path: String,
    headers: HashMap<String, String>,
    pub body: String,
}

impl CheckRequest {
    pub fn new(
        method: impl Into<String>,
        path: impl Into<String>,
        headers: impl IntoIterator<Item = (String, String)>,
        body: impl Into<String>,
    ) -> Self {
        let headers = headers
            .into_iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), value))
            .collect();

        Self {
            method: method.into(),
            path: path.into(),
            headers,
            body: body.into(),
        }
    }

    /// Build from an HTTP header map. Repeated headers are joined with `,`.
    pub fn from_http(
        method: impl Into<String>,
        path: impl Into<String>,
        header_map: &HeaderMap,
        body: impl Into<String>,
    ) -> Self {
        let mut headers: HashMap<String, String> = HashMap::new();

        for (name, value) in header_map {
            let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
            headers
                .entry(name.as_str().to_string())
                .and_modify(|existing| {
                    existing.push(',');
                    existing.push_str(&value);
                })
                .or_insert(value);
        }

        Self::new(method, path, headers, body)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// Outcome of one check. Deny never carries identity headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckDecision {
    Allow {
        headers: Vec<(String, String)>,
    },
    Deny {
        rpc_code: RpcCode,
        http_status: StatusCode,
        headers: Vec<(String, String)>,
        body: String,
    },
}

impl CheckDecision {
    pub fn allow(headers: Vec<(String, String)>) -> Self {
        Self::Allow { headers }
    }

    pub fn deny(rpc_code: RpcCode, http_status: StatusCode, body: impl Into<String>) -> Self {
        Self::Deny {
            rpc_code,
            http_status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow { .. })
    }

    pub fn rpc_code(&self) -> RpcCode {
        match self {
            Self::Allow { .. } => RpcCode::Ok,
            Self::Deny { rpc_code, .. } => *rpc_code,
        }
    }

    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Allow { .. } => StatusCode::OK,
            Self::Deny { http_status, .. } => *http_status,
        }
    }

    /// Body as logged / returned. Allow has no body of its own and reports `OK`.
    pub fn body(&self) -> &str {
        match self {
            Self::Allow { .. } => "OK",
            Self::Deny { body, .. } => body,
        }
    }
}
