use crate::db::models::DbUserToken;
use crate::db::schema::SQLITE_INIT;
use crate::error::GadsError;
use crate::google_oauth::credentials::UserToken;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, Row, Sqlite};
use std::str::FromStr;

pub type SqlitePool = Pool<Sqlite>;

#[derive(Clone)]
pub struct TokenStorage {
    pool: SqlitePool,
}

impl TokenStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if missing) the database at `database_url` and apply the schema.
    pub async fn connect(database_url: &str) -> Result<Self, GadsError> {
        let connect_opts = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(connect_opts).await?;
        let storage = Self::new(pool);
        storage.init_schema().await?;
        Ok(storage)
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), GadsError> {
        // sqlx::query runs one statement at a time
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Insert or overwrite the record keyed by `user_id`.
    /// A `None` refresh token keeps whatever refresh token is already stored.
    pub async fn upsert(&self, token: &UserToken) -> Result<(), GadsError> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            r#"
            INSERT INTO user_tokens (
                user_id, email, name, access_token, refresh_token,
                expiry, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                email=excluded.email,
                name=COALESCE(excluded.name, user_tokens.name),
                access_token=excluded.access_token,
                refresh_token=COALESCE(excluded.refresh_token, user_tokens.refresh_token),
                expiry=excluded.expiry,
                updated_at=excluded.updated_at
            "#,
        )
        .bind(&token.user_id)
        .bind(&token.email)
        .bind(&token.name)
        .bind(&token.access_token)
        .bind(&token.refresh_token)
        .bind(token.expiry.to_rfc3339())
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get(&self, user_id: &str) -> Result<Option<DbUserToken>, GadsError> {
        let row = sqlx::query(
            r#"SELECT user_id, email, name, access_token, refresh_token,
               expiry, created_at, updated_at
               FROM user_tokens WHERE user_id = ?"#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Self::row_to_model).transpose()
    }

    /// Store the result of a refresh. Returns false when no record exists.
    pub async fn update_tokens(
        &self,
        user_id: &str,
        access_token: &str,
        refresh_token: Option<&str>,
        expiry: DateTime<Utc>,
    ) -> Result<bool, GadsError> {
        let res = sqlx::query(
            r#"UPDATE user_tokens SET
                access_token = ?,
                refresh_token = COALESCE(?, refresh_token),
                expiry = ?,
                updated_at = ?
              WHERE user_id = ?"#,
        )
        .bind(access_token)
        .bind(refresh_token)
        .bind(expiry.to_rfc3339())
        .bind(Utc::now().to_rfc3339())
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    pub async fn count(&self) -> Result<i64, GadsError> {
        let rec: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM user_tokens")
            .fetch_one(&self.pool)
            .await?;
        Ok(rec.0)
    }

    fn row_to_model(row: SqliteRow) -> Result<DbUserToken, GadsError> {
        let user_id: String = row.try_get("user_id")?;
        let email: String = row.try_get("email")?;
        let name: Option<String> = row.try_get("name")?;
        let access_token: String = row.try_get("access_token")?;
        let refresh_token: Option<String> = row.try_get("refresh_token")?;
        let expiry: String = row.try_get("expiry")?;
        let created_at: String = row.try_get("created_at")?;
        let updated_at: String = row.try_get("updated_at")?;

        Ok(DbUserToken {
            user_id,
            email,
            name,
            access_token,
            refresh_token,
            expiry: parse_ts(&expiry)?,
            created_at: parse_ts(&created_at)?,
            updated_at: parse_ts(&updated_at)?,
        })
    }
}

fn parse_ts(s: &str) -> Result<DateTime<Utc>, GadsError> {
    let dt = DateTime::parse_from_rfc3339(s)
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))?
        .with_timezone(&Utc);
    Ok(dt)
}
