use crate::google_oauth::credentials::UserToken;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DbUserToken {
    pub user_id: String,
    pub email: String,
    pub name: Option<String>,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expiry: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DbUserToken> for UserToken {
    fn from(d: DbUserToken) -> Self {
        UserToken {
            user_id: d.user_id,
            email: d.email,
            name: d.name,
            access_token: d.access_token,
            refresh_token: d.refresh_token,
            expiry: d.expiry,
        }
    }
}
