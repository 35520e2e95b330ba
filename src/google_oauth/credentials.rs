use crate::error::GadsError;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Access tokens are treated as expired this long before their stated expiry.
pub const EXPIRY_SKEW_SECS: i64 = 60;

/// Lifetime assumed when the token endpoint omits `expires_in`.
pub const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

/// Per-user token record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserToken {
    pub user_id: String,
    pub email: String,
    pub name: Option<String>,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expiry: DateTime<Utc>,
}

impl UserToken {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry <= now + Duration::seconds(EXPIRY_SKEW_SECS)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// Expiry computed from an `expires_in` hint.
pub fn expiry_from(expires_in: Option<std::time::Duration>) -> DateTime<Utc> {
    let secs = expires_in
        .and_then(|d| i64::try_from(d.as_secs()).ok())
        .unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);
    Utc::now() + Duration::seconds(secs)
}

/// Subset of OpenID claims used to key a token record.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct IdentityClaims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl IdentityClaims {
    /// Decode the (unverified) payload segment of an id_token. The token comes
    /// straight from the token endpoint over TLS, so the signature is not checked.
    pub fn from_id_token(id_token: &str) -> Option<Self> {
        let payload_b64 = id_token.split('.').nth(1)?;
        let decoded = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(payload_b64.trim_end_matches('='))
            .ok()?;
        serde_json::from_slice::<Self>(&decoded).ok()
    }

    pub fn from_userinfo(value: &Value) -> Result<Self, GadsError> {
        Ok(serde_json::from_value(value.clone())?)
    }

    pub fn is_complete(&self) -> bool {
        self.sub.as_deref().is_some_and(|s| !s.is_empty())
            && self.email.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// Build the record for a freshly issued token pair.
    pub fn into_token(
        self,
        access_token: String,
        refresh_token: Option<String>,
        expiry: DateTime<Utc>,
    ) -> Result<UserToken, GadsError> {
        let user_id = self
            .sub
            .filter(|s| !s.is_empty())
            .ok_or(GadsError::MissingIdentity("sub"))?;
        let email = self
            .email
            .filter(|s| !s.is_empty())
            .ok_or(GadsError::MissingIdentity("email"))?;
        Ok(UserToken {
            user_id,
            email,
            name: self.name,
            access_token,
            refresh_token,
            expiry,
        })
    }
}
