use axum::{
    Json,
    body::Bytes,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::Value;
use tracing::warn;

use crate::mcp::jsonrpc::{JsonRpcResponse, PARSE_ERROR};

/// Body of a protocol request: one message or a batch.
#[derive(Debug)]
pub enum RpcPayload {
    Single(Value),
    Batch(Vec<Value>),
}

impl<S> FromRequest<S> for RpcPayload
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = match Bytes::from_request(req, state).await {
            Ok(b) => b,
            Err(rejection) => return Err(rejection.into_response()),
        };

        match serde_json::from_slice::<Value>(&body) {
            Ok(Value::Array(items)) => Ok(RpcPayload::Batch(items)),
            Ok(other) => Ok(RpcPayload::Single(other)),
            Err(e) => {
                warn!(error = %e, "unparseable JSON-RPC body");
                Err((
                    StatusCode::BAD_REQUEST,
                    Json(JsonRpcResponse::error(None, PARSE_ERROR, "Parse error")),
                )
                    .into_response())
            }
        }
    }
}
