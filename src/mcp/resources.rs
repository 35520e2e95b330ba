//! Help resources and the per-account template served over `resources/*`.

use crate::config::Config;
use crate::error::GadsError;
use crate::mcp::tools::{GET_ACCOUNT_SUMMARY, GET_CAMPAIGNS, GET_KEYWORDS, TOOL_NAMES};
use crate::service::gaql::CustomerId;
use serde_json::{Value, json};

pub const HELP_URI: &str = "google-ads://help";
pub const OAUTH_INFO_URI: &str = "google-ads://oauth-info";
pub const ACCOUNT_URI_PREFIX: &str = "google-ads://account/";

pub fn resource_definitions() -> Vec<Value> {
    vec![
        json!({
            "uri": HELP_URI,
            "name": "Google Ads MCP help",
            "description": "How to authenticate and which tools are available",
            "mimeType": "text/plain"
        }),
        json!({
            "uri": OAUTH_INFO_URI,
            "name": "OAuth configuration",
            "description": "Login and callback URLs for this server",
            "mimeType": "text/plain"
        }),
    ]
}

pub fn resource_templates() -> Vec<Value> {
    vec![json!({
        "uriTemplate": format!("{ACCOUNT_URI_PREFIX}{{customer_id}}"),
        "name": "Google Ads account",
        "description": "Which tools to call for one account",
        "mimeType": "text/plain"
    })]
}

pub fn read_resource(cfg: &Config, uri: &str) -> Result<Value, GadsError> {
    let text = match uri {
        HELP_URI => help_text(cfg),
        OAUTH_INFO_URI => oauth_info_text(cfg),
        other => match other.strip_prefix(ACCOUNT_URI_PREFIX) {
            Some(raw_id) => account_text(&CustomerId::parse(raw_id)?),
            None => {
                return Err(GadsError::InvalidParams(format!("Unknown resource: {other}")));
            }
        },
    };
    Ok(json!({
        "contents": [{ "uri": uri, "mimeType": "text/plain", "text": text }]
    }))
}

fn help_text(cfg: &Config) -> String {
    format!(
        "Google Ads MCP server (read-only)\n\n\
         AUTHENTICATION:\n\
         1. Visit {login} in a browser and sign in with Google.\n\
         2. Grant the Google Ads permission.\n\
         3. Note the user_id shown after the callback and pass it to every tool.\n\n\
         TOOLS:\n{tools}\n",
        login = cfg.login_url(),
        tools = TOOL_NAMES
            .iter()
            .map(|t| format!("- {t}"))
            .collect::<Vec<_>>()
            .join("\n"),
    )
}

fn oauth_info_text(cfg: &Config) -> String {
    let client_id: String = cfg.google_oauth_client_id.chars().take(20).collect();
    let configured = |ok: bool| if ok { "configured" } else { "not set" };
    format!(
        "Base URL: {base}\n\
         Client ID: {client_id}... ({client})\n\
         Developer token: {dev}\n\
         Manager account: {manager}\n\n\
         Login: {login}\n\
         Callback: {callback}\n",
        base = cfg.public_base_url,
        client = configured(!cfg.google_oauth_client_id.is_empty()),
        dev = configured(!cfg.google_ads_developer_token.is_empty()),
        manager = cfg.login_customer_id().unwrap_or_else(|| "none".to_string()),
        login = cfg.login_url(),
        callback = cfg.redirect_url(),
    )
}

fn account_text(customer_id: &CustomerId) -> String {
    format!(
        "Google Ads account: {customer_id}\n\n\
         To get data for this account, use:\n\
         - {GET_ACCOUNT_SUMMARY}(customer_id=\"{customer_id}\", days=30)\n\
         - {GET_CAMPAIGNS}(customer_id=\"{customer_id}\", days=30)\n\
         - {GET_KEYWORDS}(customer_id=\"{customer_id}\", days=30)\n\n\
         You must be signed in and have access to this account.\n"
    )
}
