pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod google_oauth;
pub mod handlers;
pub mod mcp;
pub mod middleware;
pub mod router;
pub mod service;
pub mod types;

pub use error::GadsError;
pub use google_oauth::credentials::UserToken;
