use crate::config::Config;
use crate::db::TokenStorage;
use crate::error::GadsError;
use crate::handlers::{google_oauth, health, mcp};
use crate::service::ads_service::AdsService;
use crate::service::token_service::TokenService;
use axum::{
    Router,
    extract::{DefaultBodyLimit, FromRef},
    routing::{get, post},
};
use axum_extra::extract::cookie::Key;
use std::sync::Arc;
use std::time::Duration;

/// Upper bound on JSON-RPC request bodies.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Clone)]
pub struct GadsState {
    pub cfg: Arc<Config>,
    pub client: reqwest::Client,
    pub tokens: TokenService,
    pub ads: AdsService,
    key: Key,
}

impl GadsState {
    pub fn new(cfg: Config, client: reqwest::Client, storage: TokenStorage) -> Self {
        let key = Key::derive_from(cfg.session_secret.as_bytes());
        let cfg = Arc::new(cfg);
        Self {
            tokens: TokenService::new(storage, client.clone(), cfg.clone()),
            ads: AdsService::new(client.clone(), cfg.clone()),
            client,
            cfg,
            key,
        }
    }

    /// Build the shared HTTP client, open the token database and assemble state.
    pub async fn build(cfg: Config) -> Result<Self, GadsError> {
        cfg.validate()?;
        let client = build_http_client(&cfg)?;
        let storage = TokenStorage::connect(&cfg.database_url).await?;
        Ok(Self::new(cfg, client, storage))
    }
}

impl FromRef<GadsState> for Key {
    fn from_ref(state: &GadsState) -> Self {
        state.key.clone()
    }
}

pub fn build_http_client(cfg: &Config) -> Result<reqwest::Client, GadsError> {
    let mut builder = reqwest::Client::builder()
        .user_agent(concat!("gads-nexus/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(5))
        .timeout(Duration::from_secs(30))
        // the OAuth token endpoint must not be followed through redirects
        .redirect(reqwest::redirect::Policy::none());
    if let Some(proxy_url) = cfg.proxy.as_deref().filter(|p| !p.is_empty()) {
        builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
    }
    Ok(builder.build()?)
}

pub fn gads_router(state: GadsState) -> Router {
    Router::new()
        .route("/", get(health::root_info).post(mcp::mcp_handler))
        .route("/mcp", post(mcp::mcp_handler))
        .route("/mcp/", post(mcp::mcp_handler))
        .route("/rpc", post(mcp::mcp_handler))
        .route("/rpc/", post(mcp::mcp_handler))
        .route("/tools", get(mcp::list_tools))
        .route("/health", get(health::health))
        .route("/auth/login", get(google_oauth::google_oauth_entry))
        .route("/auth/callback", get(google_oauth::google_oauth_callback))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}
