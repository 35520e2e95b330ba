use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::mcp::protocol::SERVER_NAME;
use crate::mcp::tools::TOOL_NAMES;
use crate::router::GadsState;

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

/// GET / -> what this server is and where things live.
pub async fn root_info(State(state): State<GadsState>) -> Json<Value> {
    Json(json!({
        "name": SERVER_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "mcp_endpoints": ["POST /", "POST /mcp", "POST /mcp/", "POST /rpc", "POST /rpc/"],
        "tools": TOOL_NAMES,
        "endpoints": {
            "health": "GET /health",
            "tools": "GET /tools",
            "login": state.cfg.login_url(),
            "callback": state.cfg.redirect_url(),
        },
        "access_key_required": state.cfg.mcp_access_key.as_deref().is_some_and(|k| !k.is_empty()),
    }))
}
