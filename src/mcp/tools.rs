//! Tool registry: names, descriptions, input schemas and dispatch.

use crate::error::GadsError;
use crate::router::GadsState;
use crate::service::gaql::{
    self, CustomerId, DEFAULT_DAYS, DEFAULT_LIMIT, MAX_DAYS, MAX_LIMIT,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::info;

pub const LIST_ACCESSIBLE_ACCOUNTS: &str = "list_accessible_accounts";
pub const GET_ACCOUNT_SUMMARY: &str = "get_account_summary";
pub const GET_CAMPAIGNS: &str = "get_campaigns";
pub const GET_KEYWORDS: &str = "get_keywords";
pub const GET_AUTH_STATUS: &str = "get_auth_status";

pub const TOOL_NAMES: [&str; 5] = [
    LIST_ACCESSIBLE_ACCOUNTS,
    GET_ACCOUNT_SUMMARY,
    GET_CAMPAIGNS,
    GET_KEYWORDS,
    GET_AUTH_STATUS,
];

fn default_days() -> u32 {
    DEFAULT_DAYS
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

#[derive(Debug, Deserialize)]
struct UserArgs {
    user_id: String,
}

#[derive(Debug, Deserialize)]
struct SummaryArgs {
    user_id: String,
    customer_id: String,
    #[serde(default = "default_days")]
    days: u32,
}

#[derive(Debug, Deserialize)]
struct CampaignArgs {
    user_id: String,
    customer_id: String,
    #[serde(default = "default_days")]
    days: u32,
    #[serde(default = "default_limit")]
    limit: u32,
}

#[derive(Debug, Deserialize)]
struct KeywordArgs {
    user_id: String,
    customer_id: String,
    #[serde(default)]
    campaign_id: Option<String>,
    #[serde(default = "default_days")]
    days: u32,
    #[serde(default = "default_limit")]
    limit: u32,
}

fn parse_args<T: DeserializeOwned>(args: Value) -> Result<T, GadsError> {
    serde_json::from_value(args).map_err(|e| GadsError::InvalidParams(e.to_string()))
}

fn require_user(user_id: &str) -> Result<&str, GadsError> {
    let trimmed = user_id.trim();
    if trimmed.is_empty() {
        return Err(GadsError::InvalidParams("user_id must not be empty".into()));
    }
    Ok(trimmed)
}

/// Tool descriptors as returned by `tools/list`.
pub fn tool_definitions() -> Vec<Value> {
    let user_id = json!({
        "title": "User ID",
        "type": "string",
        "minLength": 1,
        "description": "Identifier returned by the OAuth callback after signing in"
    });
    let customer_id = json!({
        "title": "Customer ID",
        "type": "string",
        "pattern": r"^\d{3}-?\d{3}-?\d{4}$",
        "description": "Google Ads customer ID (with or without dashes)"
    });
    let days = json!({
        "title": "Days",
        "type": "integer",
        "default": DEFAULT_DAYS,
        "minimum": 1,
        "maximum": MAX_DAYS
    });
    let limit = json!({
        "title": "Limit",
        "type": "integer",
        "default": DEFAULT_LIMIT,
        "minimum": 1,
        "maximum": MAX_LIMIT
    });

    vec![
        json!({
            "name": LIST_ACCESSIBLE_ACCOUNTS,
            "description": "List all Google Ads accounts the authenticated user can access (id, name, currency, timezone, is_manager).",
            "inputSchema": {
                "type": "object",
                "properties": { "user_id": user_id },
                "required": ["user_id"]
            }
        }),
        json!({
            "name": GET_ACCOUNT_SUMMARY,
            "description": "Get a performance summary (impressions, clicks, CTR, cost, CPC, conversions) for a Google Ads account over the last N days.",
            "inputSchema": {
                "type": "object",
                "properties": { "user_id": user_id, "customer_id": customer_id, "days": days },
                "required": ["user_id", "customer_id"]
            }
        }),
        json!({
            "name": GET_CAMPAIGNS,
            "description": "Get campaigns for a Google Ads account with performance metrics, ordered by cost.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "user_id": user_id, "customer_id": customer_id, "days": days, "limit": limit
                },
                "required": ["user_id", "customer_id"]
            }
        }),
        json!({
            "name": GET_KEYWORDS,
            "description": "Get keywords for a Google Ads account, optionally filtered by campaign, ordered by cost.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "user_id": user_id,
                    "customer_id": customer_id,
                    "campaign_id": {
                        "title": "Campaign ID",
                        "type": "string",
                        "pattern": r"^\d+$"
                    },
                    "days": days,
                    "limit": limit
                },
                "required": ["user_id", "customer_id"]
            }
        }),
        json!({
            "name": GET_AUTH_STATUS,
            "description": "Check whether a user has stored Google credentials and whether the access token is still valid.",
            "inputSchema": {
                "type": "object",
                "properties": { "user_id": user_id },
                "required": ["user_id"]
            }
        }),
    ]
}

/// Run one tool. Arguments are validated before any token lookup, and the
/// token is resolved before any advertising-API call.
pub async fn call_tool(state: &GadsState, name: &str, args: Value) -> Result<Value, GadsError> {
    match name {
        LIST_ACCESSIBLE_ACCOUNTS => {
            let a: UserArgs = parse_args(args)?;
            let user_id = require_user(&a.user_id)?;
            let token = state.tokens.resolve_access_token(user_id).await?;
            let accounts = state.ads.list_accounts(&token).await?;
            Ok(serde_json::to_value(accounts)?)
        }
        GET_ACCOUNT_SUMMARY => {
            let a: SummaryArgs = parse_args(args)?;
            let user_id = require_user(&a.user_id)?;
            let customer_id = CustomerId::parse(&a.customer_id)?;
            let days = gaql::check_days(a.days)?;
            let token = state.tokens.resolve_access_token(user_id).await?;
            match state.ads.account_summary(&token, &customer_id, days).await? {
                Some(summary) => Ok(serde_json::to_value(summary)?),
                None => Ok(json!({
                    "customer_id": customer_id.as_str(),
                    "message": format!("No data found for account {customer_id}")
                })),
            }
        }
        GET_CAMPAIGNS => {
            let a: CampaignArgs = parse_args(args)?;
            let user_id = require_user(&a.user_id)?;
            let customer_id = CustomerId::parse(&a.customer_id)?;
            let days = gaql::check_days(a.days)?;
            let limit = gaql::check_limit(a.limit)?;
            let token = state.tokens.resolve_access_token(user_id).await?;
            let campaigns = state.ads.campaigns(&token, &customer_id, days, limit).await?;
            Ok(serde_json::to_value(campaigns)?)
        }
        GET_KEYWORDS => {
            let a: KeywordArgs = parse_args(args)?;
            let user_id = require_user(&a.user_id)?;
            let customer_id = CustomerId::parse(&a.customer_id)?;
            let campaign_id = a
                .campaign_id
                .as_deref()
                .map(gaql::parse_campaign_id)
                .transpose()?;
            let days = gaql::check_days(a.days)?;
            let limit = gaql::check_limit(a.limit)?;
            let token = state.tokens.resolve_access_token(user_id).await?;
            let keywords = state
                .ads
                .keywords(&token, &customer_id, campaign_id.as_deref(), days, limit)
                .await?;
            Ok(serde_json::to_value(keywords)?)
        }
        GET_AUTH_STATUS => {
            let a: UserArgs = parse_args(args)?;
            let user_id = require_user(&a.user_id)?;
            auth_status(state, user_id).await
        }
        other => Err(GadsError::InvalidParams(format!("Unknown tool: {other}"))),
    }
}

async fn auth_status(state: &GadsState, user_id: &str) -> Result<Value, GadsError> {
    let login_url = state.cfg.login_url();
    let Some(token) = state.tokens.lookup(user_id).await? else {
        info!(user_id, "auth status: unknown user");
        return Ok(json!({
            "authenticated": false,
            "user_id": user_id,
            "has_refresh_token": false,
            "access_token_expired": true,
            "login_url": login_url,
            "message": format!("Not authenticated. Visit {login_url} to sign in with Google.")
        }));
    };
    let expired = token.is_expired();
    let has_refresh = token.refresh_token.is_some();
    Ok(json!({
        "authenticated": !expired || has_refresh,
        "user_id": token.user_id,
        "email": token.email,
        "name": token.name,
        "has_refresh_token": has_refresh,
        "expires_at": token.expiry.to_rfc3339(),
        "access_token_expired": expired,
        "login_url": login_url,
    }))
}
