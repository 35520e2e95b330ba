use crate::config::{Config, OAUTH_SCOPES};
use crate::error::GadsError;

use oauth2::{
    AuthUrl, AuthorizationCode, Client as OAuth2Client, ClientId, ClientSecret, CsrfToken,
    EndpointNotSet, EndpointSet, ExtraTokenFields, PkceCodeChallenge, PkceCodeVerifier,
    RedirectUrl, RefreshToken, Scope, StandardRevocableToken, StandardTokenResponse, TokenUrl,
    basic::{
        BasicErrorResponse, BasicRevocationErrorResponse, BasicTokenIntrospectionResponse,
        BasicTokenType,
    },
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

/// Stateless Google OAuth Endpoints.
pub struct GoogleOauthEndpoints;

impl GoogleOauthEndpoints {
    /// Consent-screen URL with offline access, forced consent and a PKCE challenge.
    pub fn build_authorize_url(
        cfg: &Config,
        challenge: PkceCodeChallenge,
    ) -> Result<(Url, CsrfToken), GadsError> {
        let client = build_oauth2_client(cfg)?;
        let mut req = client.authorize_url(CsrfToken::new_random);
        for scope in OAUTH_SCOPES {
            req = req.add_scope(Scope::new(scope.to_string()));
        }
        let (url, csrf) = req
            .add_extra_param("access_type", "offline")
            .add_extra_param("prompt", "consent")
            .add_extra_param("include_granted_scopes", "true")
            .set_pkce_challenge(challenge)
            .url();
        Ok((url, csrf))
    }

    pub async fn exchange_authorization_code(
        cfg: &Config,
        code: AuthorizationCode,
        verifier: PkceCodeVerifier,
        http_client: &reqwest::Client,
    ) -> Result<GoogleTokenResponse, GadsError> {
        let client = build_oauth2_client(cfg)?;
        let token = client
            .exchange_code(code)
            .set_pkce_verifier(verifier)
            .request_async(http_client)
            .await?;
        info!("Authorization code exchanged successfully");
        Ok(token)
    }

    /// Exchange a refresh token for a new access token. One request, no retry.
    pub async fn refresh_access_token(
        cfg: &Config,
        refresh_token: &str,
        http_client: &reqwest::Client,
    ) -> Result<GoogleTokenResponse, GadsError> {
        let client = build_oauth2_client(cfg)?;
        let token = client
            .exchange_refresh_token(&RefreshToken::new(refresh_token.to_string()))
            .request_async(http_client)
            .await?;
        debug!("Access token refreshed");
        Ok(token)
    }

    pub async fn fetch_userinfo(
        cfg: &Config,
        access_token: &str,
        http_client: &reqwest::Client,
    ) -> Result<Value, GadsError> {
        let resp = http_client
            .get(cfg.google_userinfo_url.as_str())
            .bearer_auth(access_token)
            .header("Accept", "application/json")
            .send()
            .await?
            .error_for_status()?;
        let body = resp.json::<Value>().await?;
        info!("Fetched userinfo");
        Ok(body)
    }
}

/// Build the Google OAuth2 client from configuration.
fn build_oauth2_client(cfg: &Config) -> Result<GoogleOauth2Client, GadsError> {
    let client = OAuth2Client::new(ClientId::new(cfg.google_oauth_client_id.clone()))
        .set_client_secret(ClientSecret::new(cfg.google_oauth_client_secret.clone()))
        .set_auth_uri(AuthUrl::new(cfg.google_auth_url.clone())?)
        .set_token_uri(TokenUrl::new(cfg.google_token_url.clone())?)
        .set_redirect_uri(RedirectUrl::new(cfg.redirect_url())?);
    Ok(client)
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GoogleTokenField {
    #[serde(rename = "id_token")]
    pub id_token: Option<String>,
}
impl ExtraTokenFields for GoogleTokenField {}

pub type GoogleTokenResponse = StandardTokenResponse<GoogleTokenField, BasicTokenType>;

pub type GoogleOauth2Client = OAuth2Client<
    BasicErrorResponse,
    GoogleTokenResponse,
    BasicTokenIntrospectionResponse,
    StandardRevocableToken,
    BasicRevocationErrorResponse,
    EndpointSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointSet,
>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorize_url_requests_offline_ads_access() {
        let cfg = Config {
            google_oauth_client_id: "client-123".into(),
            google_oauth_client_secret: "shh".into(),
            public_base_url: "https://ads.example.com".into(),
            ..Config::default()
        };
        let (challenge, _verifier) = PkceCodeChallenge::new_random_sha256();
        let (url, csrf) = GoogleOauthEndpoints::build_authorize_url(&cfg, challenge).unwrap();

        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        let get = |k: &str| {
            pairs
                .iter()
                .find(|(key, _)| key == k)
                .map(|(_, v)| v.clone())
        };

        assert!(url.as_str().starts_with(crate::config::GOOGLE_AUTH_URL));
        assert_eq!(get("client_id").as_deref(), Some("client-123"));
        assert_eq!(get("access_type").as_deref(), Some("offline"));
        assert_eq!(get("prompt").as_deref(), Some("consent"));
        assert_eq!(get("code_challenge_method").as_deref(), Some("S256"));
        assert_eq!(
            get("redirect_uri").as_deref(),
            Some("https://ads.example.com/auth/callback")
        );
        assert_eq!(get("state").as_deref(), Some(csrf.secret().as_str()));
        assert!(
            get("scope")
                .unwrap()
                .contains("https://www.googleapis.com/auth/adwords")
        );
    }
}
