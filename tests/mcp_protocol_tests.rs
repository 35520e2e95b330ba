mod common;

use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use common::{spawn_app, spawn_app_with};
use serde_json::{Value, json};
use tower::ServiceExt;

#[tokio::test]
async fn initialize_and_tools_list() {
    let t = spawn_app().await;

    let (status, body) = t
        .rpc(json!({
            "jsonrpc": "2.0",
            "id": "init-1",
            "method": "initialize",
            "params": { "protocolVersion": "2025-03-26", "capabilities": {} }
        }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "init-1");
    assert_eq!(body["jsonrpc"], "2.0");
    assert_eq!(body["result"]["protocolVersion"], "2025-03-26");
    assert!(body["result"]["capabilities"]["tools"].is_object());

    let (_, body) = t
        .rpc(json!({ "jsonrpc": "2.0", "id": 2, "method": "tools/list" }))
        .await;
    let names: Vec<&str> = body["result"]["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|tool| tool["name"].as_str().unwrap())
        .collect();
    for expected in [
        "list_accessible_accounts",
        "get_account_summary",
        "get_campaigns",
        "get_keywords",
    ] {
        assert!(names.contains(&expected), "missing {expected}");
    }
    for tool in body["result"]["tools"].as_array().unwrap() {
        assert_eq!(tool["inputSchema"]["type"], "object");
    }

    // dotted alias
    let (_, alias) = t
        .rpc(json!({ "jsonrpc": "2.0", "id": 3, "method": "tools.list" }))
        .await;
    assert_eq!(alias["result"], body["result"]);
}

#[tokio::test]
async fn notification_gets_empty_object() {
    let t = spawn_app().await;
    let (status, body) = t
        .rpc(json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));
}

#[tokio::test]
async fn batch_replies_only_to_requests() {
    let t = spawn_app().await;
    let (status, body) = t
        .rpc(json!([
            { "jsonrpc": "2.0", "id": 1, "method": "ping" },
            { "jsonrpc": "2.0", "method": "notifications/initialized" },
            { "jsonrpc": "2.0", "id": 2, "method": "does/not/exist" }
        ]))
        .await;
    assert_eq!(status, StatusCode::OK);
    let replies = body.as_array().unwrap();
    assert_eq!(replies.len(), 2);
    assert_eq!(replies[0]["id"], 1);
    assert_eq!(replies[0]["result"], json!({}));
    assert_eq!(replies[1]["id"], 2);
    assert_eq!(replies[1]["error"]["code"], -32601);

    let (status, body) = t
        .rpc(json!([{ "jsonrpc": "2.0", "method": "notifications/cancelled" }]))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn malformed_body_is_a_parse_error() {
    let t = spawn_app().await;
    let (status, body) = t.post_raw("/mcp", "{\"jsonrpc\": \"2.0\", ").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], -32700);
    assert!(body["id"].is_null());
}

#[tokio::test]
async fn root_path_accepts_rpc_too() {
    let t = spawn_app().await;
    let (status, body) = t
        .post_raw("/", r#"{"jsonrpc":"2.0","id":9,"method":"ping"}"#)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 9);
}

#[tokio::test]
async fn resources_are_listed_and_readable() {
    let t = spawn_app().await;
    let (_, list) = t
        .rpc(json!({ "jsonrpc": "2.0", "id": 1, "method": "resources/list" }))
        .await;
    let uris: Vec<&str> = list["result"]["resources"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["uri"].as_str().unwrap())
        .collect();
    assert!(uris.contains(&"google-ads://help"));

    let (_, read) = t
        .rpc(json!({
            "jsonrpc": "2.0", "id": 2, "method": "resources/read",
            "params": { "uri": "google-ads://oauth-info" }
        }))
        .await;
    let text = read["result"]["contents"][0]["text"].as_str().unwrap();
    assert!(text.contains("/auth/callback"));
    assert!(!text.contains("test-secret"));

    let (_, missing) = t
        .rpc(json!({
            "jsonrpc": "2.0", "id": 3, "method": "resources/read",
            "params": { "uri": "google-ads://nope" }
        }))
        .await;
    assert_eq!(missing["error"]["code"], -32602);
}

#[tokio::test]
async fn access_key_is_enforced_when_configured() {
    let t = spawn_app_with(|cfg| cfg.mcp_access_key = Some("s3cret".into())).await;
    let ping = r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#;

    let (status, _) = t.post_raw("/mcp", ping).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = t.post_raw("/mcp?key=s3cret", ping).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 1);

    let resp = t
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/mcp")
                .header("content-type", "application/json")
                .header("authorization", "Bearer s3cret")
                .body(Body::from(ping))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn health_and_root_info() {
    let t = spawn_app().await;
    for (uri, check) in [("/health", "ok"), ("/", "tools")] {
        let resp = t
            .app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert!(!value[check].is_null(), "{uri}: {value}");
    }
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let t = spawn_app().await;
    let huge = format!(
        r#"{{"jsonrpc":"2.0","id":1,"method":"ping","params":{{"pad":"{}"}}}}"#,
        "a".repeat(2 * 1024 * 1024)
    );
    let resp = t
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/mcp")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(huge))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn message_without_method_is_invalid_request() {
    let t = spawn_app().await;

    let (status, body) = t.rpc(json!({ "jsonrpc": "2.0" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"]["code"], -32600);
    assert!(body["id"].is_null());

    let (status, body) = t
        .rpc(json!([
            { "jsonrpc": "2.0", "params": {} },
            { "jsonrpc": "2.0", "method": "notifications/initialized" },
            { "jsonrpc": "2.0", "id": 4, "method": "ping" }
        ]))
        .await;
    assert_eq!(status, StatusCode::OK);
    let replies = body.as_array().unwrap();
    assert_eq!(replies.len(), 2);
    assert_eq!(replies[0]["error"]["code"], -32600);
    assert!(replies[0]["id"].is_null());
    assert_eq!(replies[1]["id"], 4);

    let (_, body) = t.rpc(json!([1, "x"])).await;
    let replies = body.as_array().unwrap();
    assert_eq!(replies.len(), 2);
    assert!(replies.iter().all(|r| r["error"]["code"] == -32600));
}

#[tokio::test]
async fn wrong_protocol_version_is_invalid_request() {
    let t = spawn_app().await;
    let (_, body) = t
        .rpc(json!({ "jsonrpc": "1.0", "id": 5, "method": "ping" }))
        .await;
    assert_eq!(body["id"], 5);
    assert_eq!(body["error"]["code"], -32600);

    // the version field may be left out
    let (_, body) = t.rpc(json!({ "id": 6, "method": "ping" })).await;
    assert_eq!(body["id"], 6);
    assert_eq!(body["result"], json!({}));
}

#[tokio::test]
async fn prompts_are_listed_and_rendered() {
    let t = spawn_app().await;

    let (_, init) = t
        .rpc(json!({ "jsonrpc": "2.0", "id": 1, "method": "initialize" }))
        .await;
    assert!(init["result"]["capabilities"]["prompts"].is_object());

    let (_, list) = t
        .rpc(json!({ "jsonrpc": "2.0", "id": 2, "method": "prompts/list" }))
        .await;
    let names: Vec<&str> = list["result"]["prompts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["authenticate", "get_started"]);

    let (_, got) = t
        .rpc(json!({
            "jsonrpc": "2.0", "id": 3, "method": "prompts/get",
            "params": { "name": "get_started", "arguments": { "account_name": "Acme Shoes" } }
        }))
        .await;
    let message = &got["result"]["messages"][0];
    assert_eq!(message["role"], "user");
    assert!(
        message["content"]["text"]
            .as_str()
            .unwrap()
            .contains("Acme Shoes")
    );

    let (_, missing) = t
        .rpc(json!({
            "jsonrpc": "2.0", "id": 4, "method": "prompts/get",
            "params": { "name": "nope" }
        }))
        .await;
    assert_eq!(missing["error"]["code"], -32602);
}

#[tokio::test]
async fn account_resource_template_is_served() {
    let t = spawn_app().await;

    let (_, templates) = t
        .rpc(json!({ "jsonrpc": "2.0", "id": 1, "method": "resources/templates/list" }))
        .await;
    assert_eq!(
        templates["result"]["resourceTemplates"][0]["uriTemplate"],
        "google-ads://account/{customer_id}"
    );

    let (_, read) = t
        .rpc(json!({
            "jsonrpc": "2.0", "id": 2, "method": "resources/read",
            "params": { "uri": "google-ads://account/123-456-7890" }
        }))
        .await;
    let text = read["result"]["contents"][0]["text"].as_str().unwrap();
    assert!(text.contains("1234567890"));
    assert!(text.contains("get_campaigns"));

    let (_, bad) = t
        .rpc(json!({
            "jsonrpc": "2.0", "id": 3, "method": "resources/read",
            "params": { "uri": "google-ads://account/12ab" }
        }))
        .await;
    assert_eq!(bad["error"]["code"], -32602);
}

#[tokio::test]
async fn rpc_aliases_reach_the_protocol_endpoint() {
    let t = spawn_app().await;
    for uri in ["/mcp/", "/rpc", "/rpc/"] {
        let (status, body) = t
            .post_raw(uri, r#"{"jsonrpc":"2.0","id":"a","method":"ping"}"#)
            .await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(body["id"], "a", "{uri}");
    }
}

#[tokio::test]
async fn tools_registry_lists_every_tool() {
    let t = spawn_app().await;
    let resp = t
        .app
        .clone()
        .oneshot(Request::builder().uri("/tools").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value["count"], 5);
    assert!(
        value["names"]
            .as_array()
            .unwrap()
            .contains(&json!("get_keywords"))
    );
    assert_eq!(value["tools"][0]["inputSchema"]["type"], "object");
}
