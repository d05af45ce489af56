//! Toolgate — MCP tool proxy and router
//!
//! Aggregates tool definitions from locally spawned MCP servers, a remote
//! meta-service, and internally registered handlers behind one routing
//! table, gates what each agent session can see through progressive
//! disclosure, and dispatches tool calls to the owning backend with
//! logging, chaining, and fallback-refresh semantics.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use toolgate::prelude::*;
//!
//! # async fn example(registry: Arc<dyn BackendRegistry>) {
//! let router = ToolRouter::new(RouterConfig::from_env(), registry, None);
//! router.register_chain_tool();
//! router.start().await;
//!
//! let tools = router.get_all_tools(Some("session-1"));
//! let result = router
//!     .call_tool("search_tools", serde_json::json!({"query": "files"}), Some("session-1"))
//!     .await;
//! assert!(!result.failed());
//! # let _ = tools;
//! # }
//! ```

pub mod config;
pub mod error;
pub mod log;
pub mod mcp;
pub mod prelude;
pub mod registry;
pub mod router;
pub mod tools;
