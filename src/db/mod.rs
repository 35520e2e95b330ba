//! Database module: models and schema for persistent storage.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows and conversions
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `sqlite.rs`: the token table accessor

pub mod models;
pub mod schema;
pub mod sqlite;

pub use models::DbUserToken;
pub use sqlite::TokenStorage;
