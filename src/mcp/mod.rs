//! Model Context Protocol front end.
//!
//! Clients talk JSON-RPC 2.0 over stdio, one message per line:
//!
//! ```text
//! stdin ──▶ Transport ──▶ protocol::parse_message ──▶ McpServer ──▶ pads / pattern
//!                                                         │
//! stdout ◀── Transport ◀── JsonRpcResponse / JsonRpcError ◀┘
//! ```
//!
//! Targets MCP revision 2024-11-05.

pub mod protocol;
pub mod server;
pub mod transport;

pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, MCP_PROTOCOL_VERSION};
pub use server::McpServer;
pub use transport::{StdioTransport, Transport};
