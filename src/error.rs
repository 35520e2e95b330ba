use axum::{Json, http::StatusCode, response::IntoResponse};
use oauth2::basic::BasicErrorResponseType;
use oauth2::reqwest::Error as ReqwestClientError;
use oauth2::{HttpClientError, RequestTokenError, StandardErrorResponse};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::Error as SqlxError;
use std::collections::HashMap;
use thiserror::Error as ThisError;

use crate::mcp::jsonrpc::{
    INTERNAL_ERROR, INVALID_PARAMS, NOT_AUTHENTICATED, UPSTREAM_ERROR,
};

#[derive(Debug, ThisError)]
pub enum GadsError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration error: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP request error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Not authenticated: {0}")]
    NotAuthenticated(String),

    #[error("missing `{0}` in identity claims")]
    MissingIdentity(&'static str),

    #[error("OAuth2 token request error: {0}")]
    Oauth2Token(String),

    #[error("OAuth2 server error: {error}")]
    Oauth2Server { error: String },

    #[error("OAuth flow error: {0}")]
    OauthFlow(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Database error: {0}")]
    Database(#[from] SqlxError),

    #[error("Upstream error with status: {0}")]
    UpstreamStatus(StatusCode),

    #[error("Google Ads API error: {}", .0.error.message)]
    GoogleAdsServerError(GoogleApiError),
}

impl GadsError {
    pub fn not_authenticated(reason: impl Into<String>) -> Self {
        Self::NotAuthenticated(reason.into())
    }

    /// JSON-RPC error code reported to protocol clients.
    pub fn rpc_code(&self) -> i32 {
        match self {
            GadsError::NotAuthenticated(_) => NOT_AUTHENTICATED,
            GadsError::InvalidParams(_) => INVALID_PARAMS,
            GadsError::GoogleAdsServerError(_)
            | GadsError::UpstreamStatus(_)
            | GadsError::Reqwest(_) => UPSTREAM_ERROR,
            _ => INTERNAL_ERROR,
        }
    }

    /// Message safe to hand back to a protocol client.
    pub fn rpc_message(&self) -> String {
        match self {
            GadsError::Database(_) | GadsError::Config(_) | GadsError::Figment(_) => {
                "An internal server error occurred.".to_string()
            }
            GadsError::Reqwest(_) | GadsError::UrlParse(_) => {
                "Upstream service is unavailable.".to_string()
            }
            other => other.to_string(),
        }
    }

    /// Upstream error body passed through as JSON-RPC `data`.
    pub fn rpc_data(&self) -> Option<Value> {
        match self {
            GadsError::GoogleAdsServerError(api) => Some(json!({
                "code": api.error.code,
                "status": api.error.status,
                "message": api.error.message,
                "details": api.error.extra.get("details").cloned().unwrap_or(Value::Null),
            })),
            GadsError::UpstreamStatus(status) => Some(json!({ "code": status.as_u16() })),
            _ => None,
        }
    }
}

impl
    From<
        RequestTokenError<
            HttpClientError<ReqwestClientError>,
            StandardErrorResponse<BasicErrorResponseType>,
        >,
    > for GadsError
{
    fn from(
        e: RequestTokenError<
            HttpClientError<ReqwestClientError>,
            StandardErrorResponse<BasicErrorResponseType>,
        >,
    ) -> Self {
        match e {
            RequestTokenError::ServerResponse(err) => GadsError::Oauth2Server {
                error: err.error().to_string(),
            },
            RequestTokenError::Request(req_e) => {
                GadsError::Oauth2Token(format!("request failed: {}", req_e))
            }
            RequestTokenError::Parse(parse_err, _body) => GadsError::Json(parse_err.into_inner()),
            RequestTokenError::Other(s) => GadsError::Oauth2Token(s),
        }
    }
}

impl IntoResponse for GadsError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_body) = match self {
            GadsError::GoogleAdsServerError(api_err) => {
                let status = StatusCode::from_u16(api_err.error.code as u16)
                    .unwrap_or(StatusCode::BAD_GATEWAY);

                let body = ApiErrorBody {
                    code: api_err.error.status,
                    message: api_err.error.message,
                };
                (status, body)
            }
            GadsError::Database(_) | GadsError::Config(_) | GadsError::Figment(_) => {
                let status = StatusCode::INTERNAL_SERVER_ERROR;
                let body = ApiErrorBody {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "An internal server error occurred.".to_string(),
                };
                (status, body)
            }
            GadsError::OauthFlow(msg) | GadsError::InvalidParams(msg) => {
                let status = StatusCode::BAD_REQUEST;
                let body = ApiErrorBody {
                    code: "BAD_REQUEST".to_string(),
                    message: msg,
                };
                (status, body)
            }
            GadsError::Json(_)
            | GadsError::Oauth2Token(_)
            | GadsError::Oauth2Server { .. }
            | GadsError::NotAuthenticated(_)
            | GadsError::MissingIdentity(_) => {
                let status = StatusCode::UNAUTHORIZED;
                let body = ApiErrorBody {
                    code: "UNAUTHORIZED".to_string(),
                    message: "Authentication error.".to_string(),
                };
                (status, body)
            }
            GadsError::Reqwest(_) | GadsError::UrlParse(_) => {
                let status = StatusCode::BAD_GATEWAY;
                let body = ApiErrorBody {
                    code: "BAD_GATEWAY".to_string(),
                    message: "Upstream service is unavailable.".to_string(),
                };
                (status, body)
            }
            GadsError::UpstreamStatus(code) => {
                let (err_code, msg) = match code {
                    StatusCode::TOO_MANY_REQUESTS => {
                        ("RATE_LIMIT", "Upstream rate limit exceeded.")
                    }
                    StatusCode::UNAUTHORIZED => ("UNAUTHORIZED", "Upstream authentication failed."),
                    StatusCode::FORBIDDEN => ("FORBIDDEN", "Upstream permission denied."),
                    StatusCode::NOT_FOUND => ("NOT_FOUND", "Upstream resource not found."),
                    _ => ("UPSTREAM_ERROR", "An upstream error occurred."),
                };

                (
                    code,
                    ApiErrorBody {
                        code: err_code.to_string(),
                        message: msg.to_string(),
                    },
                )
            }
        };
        (status, Json(ApiErrorResponse { error: error_body })).into_response()
    }
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

/// Google API error envelope (`{"error": {code, message, status, details}}`).
#[derive(Deserialize, Debug, Clone)]
pub struct GoogleApiError {
    pub error: GoogleApiErrorBody,
}

#[derive(Deserialize, Debug, Clone)]
pub struct GoogleApiErrorBody {
    pub code: u32,
    pub message: String,
    #[serde(default)]
    pub status: String,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl GoogleApiError {
    /// First Google Ads failure code inside `details`, e.g. `DEVELOPER_TOKEN_NOT_APPROVED`.
    pub fn ads_failure_code(&self) -> Option<String> {
        self.error
            .extra
            .get("details")?
            .as_array()?
            .iter()
            .filter_map(|detail| detail.get("errors").and_then(|e| e.as_array()))
            .flatten()
            .filter_map(|err| err.get("errorCode").and_then(|c| c.as_object()))
            .filter_map(|code| code.values().next().and_then(|v| v.as_str()))
            .map(str::to_string)
            .next()
    }
}
