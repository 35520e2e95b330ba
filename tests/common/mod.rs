#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use chrono::{Duration, Utc};
use gads_nexus::UserToken;
use gads_nexus::config::Config;
use gads_nexus::router::{GadsState, gads_router};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;
use wiremock::MockServer;

pub const CUSTOMER_ID: &str = "1234567890";

pub struct TestApp {
    pub app: Router,
    pub state: GadsState,
    pub server: MockServer,
    _dir: TempDir,
}

/// Config whose Google endpoints all point at the mock server.
pub fn test_config(server: &MockServer, dir: &TempDir) -> Config {
    Config {
        google_oauth_client_id: "test-client.apps.googleusercontent.com".into(),
        google_oauth_client_secret: "test-secret".into(),
        google_ads_developer_token: "dev-token".into(),
        public_base_url: "http://localhost:7070".into(),
        session_secret: "k".repeat(64),
        database_url: format!("sqlite://{}", dir.path().join("tokens.db").display()),
        insecure_cookie: true,
        google_auth_url: format!("{}/o/oauth2/v2/auth", server.uri()),
        google_token_url: format!("{}/token", server.uri()),
        google_userinfo_url: format!("{}/userinfo", server.uri()),
        google_ads_api_base: server.uri(),
        ..Config::default()
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

pub async fn spawn_app_with(tweak: impl FnOnce(&mut Config)) -> TestApp {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let mut cfg = test_config(&server, &dir);
    tweak(&mut cfg);
    let state = GadsState::build(cfg).await.expect("failed to build state");
    let app = gads_router(state.clone());
    TestApp {
        app,
        state,
        server,
        _dir: dir,
    }
}

impl TestApp {
    pub async fn seed_token(&self, user_id: &str, access: &str, refresh: Option<&str>, ttl: Duration) {
        let token = UserToken {
            user_id: user_id.into(),
            email: format!("{user_id}@example.com"),
            name: Some("Test User".into()),
            access_token: access.into(),
            refresh_token: refresh.map(str::to_string),
            expiry: Utc::now() + ttl,
        };
        self.state
            .tokens
            .storage()
            .upsert(&token)
            .await
            .expect("failed to seed token");
    }

    pub async fn post_raw(&self, uri: &str, body: &str) -> (StatusCode, Value) {
        let resp = self
            .app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .expect("failed to build request"),
            )
            .await
            .expect("request failed");
        let status = resp.status();
        let body = to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("failed to read response body");
        let value = serde_json::from_slice(&body).expect("response body was not JSON");
        (status, value)
    }

    pub async fn rpc(&self, body: Value) -> (StatusCode, Value) {
        self.post_raw("/mcp", &body.to_string()).await
    }

    pub async fn call_tool(&self, name: &str, arguments: Value) -> Value {
        let (status, body) = self
            .rpc(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "tools/call",
                "params": { "name": name, "arguments": arguments }
            }))
            .await;
        assert_eq!(status, StatusCode::OK);
        body
    }
}

/// Token endpoint reply as Google sends it.
pub fn token_body(access: &str, refresh: Option<&str>, id_token: Option<&str>) -> Value {
    let mut body = json!({
        "access_token": access,
        "token_type": "Bearer",
        "expires_in": 3599,
        "scope": "https://www.googleapis.com/auth/adwords openid email profile"
    });
    if let Some(r) = refresh {
        body["refresh_token"] = json!(r);
    }
    if let Some(t) = id_token {
        body["id_token"] = json!(t);
    }
    body
}

pub fn search_body(rows: Value) -> Value {
    json!({ "results": rows, "fieldMask": "campaign.id,campaign.name" })
}
