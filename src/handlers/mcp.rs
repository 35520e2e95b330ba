use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use tracing::debug;

use crate::mcp::handle_message;
use crate::mcp::tools::tool_definitions;
use crate::middleware::{RequireAccessKey, RpcPayload};
use crate::router::GadsState;

/// POST /mcp -> JSON-RPC 2.0 endpoint, single or batch.
///
/// Notifications get no reply: a lone notification answers `{}` and a batch
/// of only notifications answers `[]`, both with HTTP 200.
pub async fn mcp_handler(
    State(state): State<GadsState>,
    _auth: RequireAccessKey,
    payload: RpcPayload,
) -> Response {
    match payload {
        RpcPayload::Single(message) => match handle_message(&state, message).await {
            Some(reply) => Json(reply).into_response(),
            None => Json(json!({})).into_response(),
        },
        RpcPayload::Batch(messages) => {
            debug!(size = messages.len(), "JSON-RPC batch");
            let mut replies = Vec::with_capacity(messages.len());
            for message in messages {
                if let Some(reply) = handle_message(&state, message).await {
                    replies.push(reply);
                }
            }
            Json(replies).into_response()
        }
    }
}

/// GET /tools -> the tool registry, outside the JSON-RPC envelope.
pub async fn list_tools(_auth: RequireAccessKey) -> Json<Value> {
    let tools = tool_definitions();
    let names: Vec<Value> = tools.iter().map(|t| t["name"].clone()).collect();
    Json(json!({
        "count": tools.len(),
        "names": names,
        "tools": tools,
    }))
}
