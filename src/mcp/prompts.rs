//! Canned prompts served over `prompts/list` and `prompts/get`.

use crate::error::GadsError;
use crate::mcp::resources::OAUTH_INFO_URI;
use crate::mcp::tools::{
    GET_ACCOUNT_SUMMARY, GET_AUTH_STATUS, GET_CAMPAIGNS, LIST_ACCESSIBLE_ACCOUNTS,
};
use serde_json::{Value, json};

pub const AUTHENTICATE: &str = "authenticate";
pub const GET_STARTED: &str = "get_started";

const DEFAULT_ACCOUNT_NAME: &str = "your account";

pub fn prompt_definitions() -> Vec<Value> {
    vec![
        json!({
            "name": AUTHENTICATE,
            "description": "Walk through signing in with Google before using the tools",
            "arguments": []
        }),
        json!({
            "name": GET_STARTED,
            "description": "First steps for exploring an account's Google Ads data",
            "arguments": [{
                "name": "account_name",
                "description": "How to refer to the account",
                "required": false
            }]
        }),
    ]
}

/// Render one prompt. Unknown names and non-string arguments are invalid params.
pub fn get_prompt(name: &str, arguments: &Value) -> Result<Value, GadsError> {
    let (description, text) = match name {
        AUTHENTICATE => ("Authenticate with Google Ads", authenticate_text()),
        GET_STARTED => {
            let account_name = match arguments.get("account_name") {
                None | Some(Value::Null) => DEFAULT_ACCOUNT_NAME,
                Some(Value::String(s)) if !s.trim().is_empty() => s.as_str(),
                Some(Value::String(_)) => DEFAULT_ACCOUNT_NAME,
                Some(_) => {
                    return Err(GadsError::InvalidParams(
                        "account_name must be a string".into(),
                    ));
                }
            };
            ("Get started with Google Ads data", get_started_text(account_name))
        }
        other => return Err(GadsError::InvalidParams(format!("Unknown prompt: {other}"))),
    };
    Ok(json!({
        "description": description,
        "messages": [{
            "role": "user",
            "content": { "type": "text", "text": text }
        }]
    }))
}

fn authenticate_text() -> String {
    format!(
        "To access your Google Ads data:\n\n\
         1. Check your authentication status with the `{GET_AUTH_STATUS}` tool.\n\
         2. If you are not authenticated, open the login URL from the `{OAUTH_INFO_URI}` resource \
         and sign in with Google.\n\
         3. Once signed in, list your accounts with `{LIST_ACCESSIBLE_ACCOUNTS}` and fetch \
         summaries, campaigns and keywords.\n\n\
         Your credentials are only used for your own requests."
    )
}

fn get_started_text(account_name: &str) -> String {
    format!(
        "Let's look at {account_name} data:\n\n\
         1. Check authentication: {GET_AUTH_STATUS}\n\
         2. List accounts: {LIST_ACCESSIBLE_ACCOUNTS}\n\
         3. Get an account summary: {GET_ACCOUNT_SUMMARY}(customer_id=\"...\")\n\
         4. Explore campaigns: {GET_CAMPAIGNS}(customer_id=\"...\")\n\n\
         What would you like to see first?"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_started_uses_account_name() {
        let v = get_prompt(GET_STARTED, &json!({ "account_name": "Acme Shoes" })).unwrap();
        let text = v["messages"][0]["content"]["text"].as_str().unwrap();
        assert!(text.starts_with("Let's look at Acme Shoes data"));

        let v = get_prompt(GET_STARTED, &Value::Null).unwrap();
        let text = v["messages"][0]["content"]["text"].as_str().unwrap();
        assert!(text.contains("your account"));
    }

    #[test]
    fn bad_prompt_requests_are_invalid_params() {
        assert!(matches!(
            get_prompt("nope", &Value::Null),
            Err(GadsError::InvalidParams(_))
        ));
        assert!(matches!(
            get_prompt(GET_STARTED, &json!({ "account_name": 5 })),
            Err(GadsError::InvalidParams(_))
        ));
    }
}
