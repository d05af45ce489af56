//! Closure-based internal tool handlers.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::ToolGateError;
use crate::mcp::schema::MCPToolSchema;

use super::arguments::ToolArguments;

/// Context available during tool execution.
#[derive(Debug, Clone, Default)]
pub struct ToolExecutionContext {
    /// Session identifier of the calling agent, when known.
    pub session_id: Option<String>,
    /// Additional metadata for the tool.
    pub metadata: serde_json::Value,
}

impl ToolExecutionContext {
    pub fn for_session(session_id: Option<&str>) -> Self {
        Self {
            session_id: session_id.map(str::to_owned),
            metadata: serde_json::Value::Null,
        }
    }
}

/// Type alias for the tool handler function.
type ToolHandler = dyn Fn(
        ToolArguments,
        ToolExecutionContext,
    ) -> Pin<Box<dyn Future<Output = Result<serde_json::Value, ToolGateError>> + Send>>
    + Send
    + Sync;

/// An internally registered tool: schema plus async handler closure.
#[derive(Clone)]
pub struct InternalTool {
    schema: MCPToolSchema,
    handler: Arc<ToolHandler>,
}

impl InternalTool {
    /// Create a tool from a closure.
    pub fn new<F, Fut>(schema: MCPToolSchema, handler: F) -> Self
    where
        F: Fn(ToolArguments, ToolExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<serde_json::Value, ToolGateError>> + Send + 'static,
    {
        Self {
            schema,
            handler: Arc::new(move |args, ctx| Box::pin(handler(args, ctx))),
        }
    }

    pub fn name(&self) -> &str {
        &self.schema.name
    }

    pub fn schema(&self) -> &MCPToolSchema {
        &self.schema
    }

    /// Invoke the handler.
    pub async fn invoke(
        &self,
        args: ToolArguments,
        ctx: ToolExecutionContext,
    ) -> Result<serde_json::Value, ToolGateError> {
        (self.handler)(args, ctx).await
    }
}

impl std::fmt::Debug for InternalTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InternalTool")
            .field("name", &self.schema.name)
            .finish()
    }
}
