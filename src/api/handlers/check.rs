/*
 * Responsibility
 * - Envoy ext_authz (HTTP service) の transport
 *   - proxied request → CheckRequest (prefix を外した元の path)
 *   - CheckDecision → HTTP response (Allow: 200 + headers / Deny: status + text body)
 * - 判定ロジックは services::authz 側。ここは変換のみで、常に response を返す
 */
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use tracing::{debug, error};

use crate::services::authz::{CheckDecision, CheckRequest};
use crate::state::AppState;

const UNREPRESENTABLE_HEADER_BODY: &str = "Cannot convert claims to header";

pub async fn check(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = original_path(&uri, &state.check_path_prefix);
    let body = String::from_utf8_lossy(&body);
    let req = CheckRequest::from_http(method.as_str(), path, &headers, body);

    let decision = state.checker.check(&req);

    debug!(
        allowed = decision.is_allowed(),
        rpc_code = decision.rpc_code().as_i32(),
        rpc_status = decision.rpc_code().as_str(),
        status = decision.http_status().as_u16(),
        "ext_authz decision"
    );

    decision_response(decision)
}

/// Path-and-query of the proxied request, without the check prefix.
fn original_path(uri: &Uri, prefix: &str) -> String {
    let full = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    let rest = full.strip_prefix(prefix).unwrap_or(full);

    if rest.starts_with('/') {
        rest.to_string()
    } else {
        format!("/{rest}")
    }
}

fn decision_response(decision: CheckDecision) -> Response {
    let (mut response, headers) = match decision {
        CheckDecision::Allow { headers } => (StatusCode::OK.into_response(), headers),
        CheckDecision::Deny {
            http_status,
            headers,
            body,
            ..
        } => ((http_status, body).into_response(), headers),
    };

    for (name, value) in headers {
        let parsed = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(&value),
        );
        match parsed {
            (Ok(name), Ok(value)) => {
                response.headers_mut().append(name, value);
            }
            _ => {
                // Fail closed: a decision we cannot express must not become an allow.
                error!(header = %name, "decision header is not a valid HTTP header");
                return (StatusCode::SERVICE_UNAVAILABLE, UNREPRESENTABLE_HEADER_BODY)
                    .into_response();
            }
        }
    }

    response
}
