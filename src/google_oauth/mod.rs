//! Google OAuth 2.0: client construction, consent URL, code exchange, refresh
//! and identity extraction.

pub mod credentials;
pub mod endpoints;

pub use credentials::{IdentityClaims, UserToken};
pub use endpoints::GoogleOauthEndpoints;
