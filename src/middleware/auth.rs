use axum::Json;
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, StatusCode, request::Parts};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use subtle::ConstantTimeEq;

use crate::router::GadsState;

fn key_matches(candidate: &str, expected: &str) -> bool {
    bool::from(candidate.as_bytes().ct_eq(expected.as_bytes()))
}

/// Ensure the inbound request carries the configured access key.
/// Accepts either:
/// - Header: `Authorization: Bearer ...`
/// - Header: `x-api-key: ...`
/// - Query string: `?key=...`
///
/// When no key is configured every request passes.
pub fn ensure_authorized(
    expected: Option<&str>,
    headers: &HeaderMap,
    query: Option<&str>,
) -> Result<(), Response> {
    let Some(expected) = expected.filter(|k| !k.is_empty()) else {
        return Ok(());
    };

    if let Some(auth) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
        let auth = auth.trim();
        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "));
        if token.is_some_and(|t| key_matches(t.trim(), expected)) {
            return Ok(());
        }
    }

    if let Some(hv) = headers.get("x-api-key").and_then(|v| v.to_str().ok()) {
        if key_matches(hv, expected) {
            return Ok(());
        }
    }

    if let Some(qs) = query {
        for (k, v) in url::form_urlencoded::parse(qs.as_bytes()) {
            if k == "key" && key_matches(&v, expected) {
                return Ok(());
            }
        }
    }

    Err((
        StatusCode::UNAUTHORIZED,
        Json(json!({"error": "unauthorized", "reason": "invalid or missing access key"})),
    )
        .into_response())
}

#[derive(Debug, Clone, Copy)]
pub struct RequireAccessKey;

impl FromRequestParts<GadsState> for RequireAccessKey {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &GadsState,
    ) -> Result<Self, Self::Rejection> {
        ensure_authorized(
            state.cfg.mcp_access_key.as_deref(),
            &parts.headers,
            parts.uri.query(),
        )?;
        Ok(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn no_configured_key_allows_everything() {
        assert!(ensure_authorized(None, &HeaderMap::new(), None).is_ok());
        assert!(ensure_authorized(Some(""), &HeaderMap::new(), None).is_ok());
    }

    #[test]
    fn accepts_bearer_header_and_query() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer k3y"));
        assert!(ensure_authorized(Some("k3y"), &headers, None).is_ok());

        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_static("k3y"));
        assert!(ensure_authorized(Some("k3y"), &headers, None).is_ok());

        assert!(ensure_authorized(Some("k3y"), &HeaderMap::new(), Some("a=1&key=k3y")).is_ok());
    }

    #[test]
    fn rejects_wrong_or_missing_key() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer nope"));
        let resp = ensure_authorized(Some("k3y"), &headers, Some("key=also-nope")).unwrap_err();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(ensure_authorized(Some("k3y"), &HeaderMap::new(), None).is_err());
    }
}
