use crate::config::Config;
use crate::db::TokenStorage;
use crate::error::GadsError;
use crate::google_oauth::credentials::{IdentityClaims, UserToken, expiry_from};
use crate::google_oauth::endpoints::{GoogleOauthEndpoints, GoogleTokenResponse};
use oauth2::TokenResponse;
use std::sync::Arc;
use tracing::{info, warn};

/// Resolves per-user access tokens, refreshing them when they have expired.
#[derive(Clone)]
pub struct TokenService {
    storage: TokenStorage,
    http: reqwest::Client,
    cfg: Arc<Config>,
}

impl TokenService {
    pub fn new(storage: TokenStorage, http: reqwest::Client, cfg: Arc<Config>) -> Self {
        Self { storage, http, cfg }
    }

    pub fn storage(&self) -> &TokenStorage {
        &self.storage
    }

    pub async fn lookup(&self, user_id: &str) -> Result<Option<UserToken>, GadsError> {
        Ok(self.storage.get(user_id).await?.map(UserToken::from))
    }

    /// Return a usable access token for `user_id`.
    ///
    /// A fresh stored token is returned as is. An expired one triggers exactly
    /// one refresh against the token endpoint; any failure along the way is
    /// reported as [`GadsError::NotAuthenticated`].
    pub async fn resolve_access_token(&self, user_id: &str) -> Result<String, GadsError> {
        let Some(token) = self.lookup(user_id).await? else {
            warn!(user_id, "no stored token");
            return Err(GadsError::not_authenticated(format!(
                "no stored credentials for user; sign in at {}",
                self.cfg.login_url()
            )));
        };

        if !token.is_expired() {
            return Ok(token.access_token);
        }

        let Some(refresh_token) = token.refresh_token.as_deref() else {
            warn!(user_id, "access token expired and no refresh token stored");
            return Err(GadsError::not_authenticated(format!(
                "access token expired and cannot be refreshed; sign in again at {}",
                self.cfg.login_url()
            )));
        };

        let refreshed =
            match GoogleOauthEndpoints::refresh_access_token(&self.cfg, refresh_token, &self.http)
                .await
            {
                Ok(resp) => resp,
                Err(e) => {
                    warn!(user_id, error = %e, "token refresh failed");
                    return Err(GadsError::not_authenticated(format!(
                        "token refresh failed ({e}); sign in again at {}",
                        self.cfg.login_url()
                    )));
                }
            };

        let access_token = refreshed.access_token().secret().to_string();
        let rotated = refreshed.refresh_token().map(|t| t.secret().as_str());
        let expiry = expiry_from(refreshed.expires_in());
        self.storage
            .update_tokens(user_id, &access_token, rotated, expiry)
            .await?;
        info!(user_id, expiry = %expiry, "access token refreshed");
        Ok(access_token)
    }

    /// Turn a code-exchange response into a stored record.
    ///
    /// Identity comes from the id_token when present, falling back to the
    /// userinfo endpoint.
    pub async fn store_authorization(
        &self,
        response: &GoogleTokenResponse,
    ) -> Result<UserToken, GadsError> {
        let access_token = response.access_token().secret().to_string();

        let mut claims = response
            .extra_fields()
            .id_token
            .as_deref()
            .and_then(IdentityClaims::from_id_token)
            .unwrap_or_default();
        if !claims.is_complete() {
            let userinfo =
                GoogleOauthEndpoints::fetch_userinfo(&self.cfg, &access_token, &self.http).await?;
            let fetched = IdentityClaims::from_userinfo(&userinfo)?;
            claims = IdentityClaims {
                sub: claims.sub.or(fetched.sub),
                email: claims.email.or(fetched.email),
                name: claims.name.or(fetched.name),
            };
        }

        let refresh_token = response.refresh_token().map(|t| t.secret().to_string());
        if refresh_token.is_none() {
            warn!("authorization returned no refresh_token; keeping any stored one");
        }
        let token = claims.into_token(
            access_token,
            refresh_token,
            expiry_from(response.expires_in()),
        )?;
        self.storage.upsert(&token).await?;
        info!(user_id = %token.user_id, email = %token.email, "stored user token");
        Ok(token)
    }
}
