//! SQL DDL for initializing the token storage.
//! SQLite-first design; can be adapted for other RDBMS.

/// SQLite schema with:
/// - `user_id` TEXT PRIMARY KEY (the provider's stable subject id)
/// - token fields mirrored from `UserToken`
/// - timestamps stored as RFC3339 TEXT
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS user_tokens (
    user_id TEXT PRIMARY KEY NOT NULL,
    email TEXT NOT NULL,
    name TEXT NULL,
    access_token TEXT NOT NULL,
    refresh_token TEXT NULL,
    expiry TEXT NOT NULL, -- RFC3339
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_user_tokens_email ON user_tokens(email);
"#;
