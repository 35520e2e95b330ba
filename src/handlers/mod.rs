pub mod google_oauth;
pub mod health;
pub mod mcp;
