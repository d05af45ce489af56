//! Convenience re-exports for common use.

pub use crate::config::RouterConfig;
pub use crate::error::{Result, ToolGateError};
pub use crate::log::{InvocationRecord, InvocationSink, TracingSink};
pub use crate::mcp::{MCPClient, MCPToolSchema, SchemaBuilder};
pub use crate::registry::{
    BackendClient, BackendRegistry, ClientHandle, MetaClient, ServerInfo, ServerStatus,
    ToolSearchIndex,
};
pub use crate::router::{BackendId, ChainStep, ToolRouter, CHAIN_TOOL, LOAD_TOOL, SEARCH_TOOLS};
pub use crate::tools::{ContentItem, ToolArguments, ToolCallResult, ToolExecutionContext};
