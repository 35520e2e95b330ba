pub mod auth;
pub mod rpc_request;

pub use auth::RequireAccessKey;
pub use rpc_request::RpcPayload;
