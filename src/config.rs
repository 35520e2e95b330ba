use crate::error::GadsError;
use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use url::Url;

pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const GOOGLE_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";
pub const GOOGLE_ADS_API_BASE: &str = "https://googleads.googleapis.com";

/// Scopes requested on the consent screen.
pub const OAUTH_SCOPES: [&str; 4] = [
    "https://www.googleapis.com/auth/adwords",
    "openid",
    "email",
    "profile",
];

/// Environment keys read by [`Config::from_env`]. Keys are matched lowercased
/// against the field names below.
const ENV_KEYS: [&str; 17] = [
    "GOOGLE_OAUTH_CLIENT_ID",
    "GOOGLE_OAUTH_CLIENT_SECRET",
    "GOOGLE_ADS_DEVELOPER_TOKEN",
    "GOOGLE_ADS_LOGIN_CUSTOMER_ID",
    "GOOGLE_ADS_API_VERSION",
    "PUBLIC_BASE_URL",
    "SESSION_SECRET",
    "DATABASE_URL",
    "LISTEN_ADDR",
    "LOGLEVEL",
    "PROXY",
    "MCP_ACCESS_KEY",
    "INSECURE_COOKIE",
    "GOOGLE_AUTH_URL",
    "GOOGLE_TOKEN_URL",
    "GOOGLE_USERINFO_URL",
    "GOOGLE_ADS_API_BASE",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub google_oauth_client_id: String,
    pub google_oauth_client_secret: String,
    pub google_ads_developer_token: String,
    /// Manager account sent as `login-customer-id`.
    pub google_ads_login_customer_id: Option<String>,
    pub google_ads_api_version: String,

    /// Externally reachable origin; the OAuth redirect is `{public_base_url}/auth/callback`.
    pub public_base_url: String,
    /// Master key for private cookies. At least 32 bytes.
    pub session_secret: String,

    pub database_url: String,
    pub listen_addr: String,
    pub loglevel: String,
    pub proxy: Option<String>,
    pub mcp_access_key: Option<String>,
    pub insecure_cookie: bool,

    pub google_auth_url: String,
    pub google_token_url: String,
    pub google_userinfo_url: String,
    pub google_ads_api_base: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            google_oauth_client_id: String::new(),
            google_oauth_client_secret: String::new(),
            google_ads_developer_token: String::new(),
            google_ads_login_customer_id: None,
            google_ads_api_version: "v19".to_string(),
            public_base_url: String::new(),
            session_secret: String::new(),
            database_url: "sqlite://gads_tokens.db".to_string(),
            listen_addr: "0.0.0.0:7070".to_string(),
            loglevel: "info".to_string(),
            proxy: None,
            mcp_access_key: None,
            insecure_cookie: false,
            google_auth_url: GOOGLE_AUTH_URL.to_string(),
            google_token_url: GOOGLE_TOKEN_URL.to_string(),
            google_userinfo_url: GOOGLE_USERINFO_URL.to_string(),
            google_ads_api_base: GOOGLE_ADS_API_BASE.to_string(),
        }
    }
}

impl Config {
    /// Layer the process environment over defaults and validate the result.
    pub fn from_env() -> Result<Self, GadsError> {
        let cfg: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Env::raw().only(&ENV_KEYS))
            .extract()
            .map_err(Box::new)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), GadsError> {
        let required = [
            ("GOOGLE_OAUTH_CLIENT_ID", &self.google_oauth_client_id),
            ("GOOGLE_OAUTH_CLIENT_SECRET", &self.google_oauth_client_secret),
            ("GOOGLE_ADS_DEVELOPER_TOKEN", &self.google_ads_developer_token),
            ("PUBLIC_BASE_URL", &self.public_base_url),
            ("SESSION_SECRET", &self.session_secret),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, v)| v.trim().is_empty())
            .map(|(k, _)| *k)
            .collect();
        if !missing.is_empty() {
            return Err(GadsError::Config(format!(
                "missing required environment variable(s): {}",
                missing.join(", ")
            )));
        }

        Url::parse(&self.public_base_url)
            .map_err(|e| GadsError::Config(format!("PUBLIC_BASE_URL is not a valid URL: {e}")))?;

        if self.session_secret.len() < 32 {
            return Err(GadsError::Config(
                "SESSION_SECRET must be at least 32 bytes".to_string(),
            ));
        }

        if let Some(login) = self.google_ads_login_customer_id.as_deref() {
            let digits = login.replace('-', "");
            if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
                return Err(GadsError::Config(format!(
                    "GOOGLE_ADS_LOGIN_CUSTOMER_ID must be numeric, got {login:?}"
                )));
            }
        }
        Ok(())
    }

    pub fn redirect_url(&self) -> String {
        format!("{}/auth/callback", self.public_base_url.trim_end_matches('/'))
    }

    pub fn login_url(&self) -> String {
        format!("{}/auth/login", self.public_base_url.trim_end_matches('/'))
    }

    /// Manager id with dashes removed, as the API expects it.
    pub fn login_customer_id(&self) -> Option<String> {
        self.google_ads_login_customer_id
            .as_deref()
            .map(|s| s.replace('-', ""))
            .filter(|s| !s.is_empty())
    }

    pub fn ads_api_root(&self) -> String {
        format!(
            "{}/{}",
            self.google_ads_api_base.trim_end_matches('/'),
            self.google_ads_api_version
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Config {
        Config {
            google_oauth_client_id: "client".into(),
            google_oauth_client_secret: "secret".into(),
            google_ads_developer_token: "devtoken".into(),
            public_base_url: "https://ads.example.com/".into(),
            session_secret: "s".repeat(64),
            ..Config::default()
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn missing_required_fields_are_listed() {
        let cfg = Config {
            google_ads_developer_token: String::new(),
            session_secret: String::new(),
            ..valid()
        };
        let err = cfg.validate().unwrap_err().to_string();
        assert!(err.contains("GOOGLE_ADS_DEVELOPER_TOKEN"));
        assert!(err.contains("SESSION_SECRET"));
    }

    #[test]
    fn short_session_secret_is_rejected() {
        let cfg = Config {
            session_secret: "too-short".into(),
            ..valid()
        };
        assert!(matches!(cfg.validate(), Err(GadsError::Config(_))));
    }

    #[test]
    fn bad_base_url_is_rejected() {
        let cfg = Config {
            public_base_url: "not a url".into(),
            ..valid()
        };
        assert!(matches!(cfg.validate(), Err(GadsError::Config(_))));
    }

    #[test]
    fn derived_urls_trim_trailing_slash() {
        let cfg = valid();
        assert_eq!(cfg.redirect_url(), "https://ads.example.com/auth/callback");
        assert_eq!(cfg.login_url(), "https://ads.example.com/auth/login");
        assert_eq!(cfg.ads_api_root(), "https://googleads.googleapis.com/v19");
    }

    #[test]
    fn login_customer_id_strips_dashes() {
        let cfg = Config {
            google_ads_login_customer_id: Some("123-456-7890".into()),
            ..valid()
        };
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.login_customer_id().as_deref(), Some("1234567890"));
    }
}
