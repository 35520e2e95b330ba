use crate::error::GadsError;
use crate::mcp::jsonrpc::{
    INVALID_PARAMS, INVALID_REQUEST, JsonRpcRequest, JsonRpcResponse, METHOD_NOT_FOUND,
};
use crate::mcp::{prompts, resources, tools};
use crate::router::GadsState;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

pub const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";
pub const SERVER_NAME: &str = "Google Ads MCP Server";

/// Handle one raw JSON-RPC message. `None` means no reply (notification).
pub async fn handle_message(state: &GadsState, raw: Value) -> Option<JsonRpcResponse> {
    if !raw.is_object() {
        return Some(JsonRpcResponse::error(None, INVALID_REQUEST, "Invalid Request"));
    }
    let id = raw.get("id").cloned().filter(|v| !v.is_null());
    let request: JsonRpcRequest = match serde_json::from_value(raw) {
        Ok(r) => r,
        Err(e) => {
            warn!(error = %e, "malformed JSON-RPC request");
            return Some(JsonRpcResponse::error(id, INVALID_REQUEST, "Invalid Request"));
        }
    };
    if !request.has_valid_version() {
        warn!(version = ?request.jsonrpc, "unsupported JSON-RPC version");
        return Some(JsonRpcResponse::error(id, INVALID_REQUEST, "Invalid Request"));
    }

    if request.is_notification() {
        debug!(method = %request.method, "notification received");
        return None;
    }
    Some(dispatch(state, request).await)
}

async fn dispatch(state: &GadsState, request: JsonRpcRequest) -> JsonRpcResponse {
    let id = request.id;
    let params = request.params.unwrap_or(Value::Null);
    info!(method = %request.method, "dispatching JSON-RPC request");

    match request.method.as_str() {
        "initialize" => JsonRpcResponse::success(id, initialize_result(&params)),
        "ping" => JsonRpcResponse::success(id, json!({})),
        "tools/list" | "tools.list" => {
            JsonRpcResponse::success(id, json!({ "tools": tools::tool_definitions() }))
        }
        "tools/call" | "tools.call" => match tools_call(state, params).await {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(e) => error_response(id, e),
        },
        "resources/list" => JsonRpcResponse::success(
            id,
            json!({ "resources": resources::resource_definitions() }),
        ),
        "resources/templates/list" => JsonRpcResponse::success(
            id,
            json!({ "resourceTemplates": resources::resource_templates() }),
        ),
        "prompts/list" => {
            JsonRpcResponse::success(id, json!({ "prompts": prompts::prompt_definitions() }))
        }
        "prompts/get" => {
            let name = params.get("name").and_then(Value::as_str).unwrap_or_default();
            let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);
            match prompts::get_prompt(name, &arguments) {
                Ok(result) => JsonRpcResponse::success(id, result),
                Err(e) => error_response(id, e),
            }
        }
        "resources/read" => {
            let uri = params.get("uri").and_then(Value::as_str).unwrap_or_default();
            match resources::read_resource(&state.cfg, uri) {
                Ok(result) => JsonRpcResponse::success(id, result),
                Err(e) => error_response(id, e),
            }
        }
        other => {
            warn!(method = other, "unknown method");
            JsonRpcResponse::error(id, METHOD_NOT_FOUND, format!("Method not found: {other}"))
        }
    }
}

fn initialize_result(params: &Value) -> Value {
    let proto = params
        .get("protocolVersion")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_PROTOCOL_VERSION);
    json!({
        "protocolVersion": proto,
        "capabilities": {
            "tools": { "listChanged": false },
            "resources": { "listChanged": false },
            "prompts": { "listChanged": false }
        },
        "serverInfo": { "name": SERVER_NAME, "version": env!("CARGO_PKG_VERSION") },
        "instructions": "Read-only Google Ads tools. Sign in at /auth/login, then pass the returned user_id to every tool."
    })
}

async fn tools_call(state: &GadsState, params: Value) -> Result<Value, GadsError> {
    let name = params
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| GadsError::InvalidParams("missing tool name".into()))?
        .to_string();
    let args = match params.get("arguments") {
        None | Some(Value::Null) => json!({}),
        Some(v @ Value::Object(_)) => v.clone(),
        Some(_) => {
            return Err(GadsError::InvalidParams(
                "tool arguments must be an object".into(),
            ));
        }
    };

    info!(tool = %name, "calling tool");
    let result = tools::call_tool(state, &name, args).await?;
    let text = serde_json::to_string_pretty(&result)?;
    Ok(json!({
        "content": [{ "type": "text", "text": text }],
        "structuredContent": structured(result),
        "isError": false
    }))
}

/// `structuredContent` must be an object; arrays are wrapped.
fn structured(result: Value) -> Value {
    match result {
        Value::Object(_) => result,
        other => json!({ "items": other }),
    }
}

fn error_response(id: Option<Value>, err: GadsError) -> JsonRpcResponse {
    let code = err.rpc_code();
    if code == INVALID_PARAMS {
        debug!(error = %err, "rejected tool parameters");
    } else {
        warn!(code, error = %err, "request failed");
    }
    JsonRpcResponse::error_with_data(id, code, err.rpc_message(), err.rpc_data())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initialize_echoes_client_protocol_version() {
        let v = initialize_result(&json!({ "protocolVersion": "2025-06-18" }));
        assert_eq!(v["protocolVersion"], "2025-06-18");
        assert_eq!(v["serverInfo"]["name"], SERVER_NAME);
        assert!(v["capabilities"]["tools"].is_object());
        assert!(v["capabilities"]["prompts"].is_object());

        let default = initialize_result(&Value::Null);
        assert_eq!(default["protocolVersion"], DEFAULT_PROTOCOL_VERSION);
    }

    #[test]
    fn arrays_are_wrapped_for_structured_content() {
        assert_eq!(structured(json!([1, 2])), json!({ "items": [1, 2] }));
        assert_eq!(structured(json!({ "a": 1 })), json!({ "a": 1 }));
    }
}
