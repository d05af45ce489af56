//! Model Context Protocol (MCP) client and schema types.

pub mod client;
pub mod schema;

pub use client::{MCPClient, MCPToolCallResult};
pub use schema::{MCPToolSchema, SchemaBuilder};
