//! MCP over JSON-RPC 2.0: wire types, method dispatch, tools, resources and prompts.

pub mod jsonrpc;
pub mod prompts;
pub mod protocol;
pub mod resources;
pub mod tools;

pub use jsonrpc::{JsonRpcRequest, JsonRpcResponse};
pub use protocol::handle_message;
