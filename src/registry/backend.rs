//! Contracts consumed from the backend process supervisor.
//!
//! The router never starts or stops server processes itself; it sees the
//! topology through [`BackendRegistry`] and talks to servers through
//! [`BackendClient`] handles the registry hands out.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{broadcast, Mutex};

use crate::error::ToolGateError;
use crate::mcp::client::{MCPClient, MCPToolCallResult};
use crate::mcp::schema::MCPToolSchema;

/// Reported lifecycle state of a local MCP server process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerStatus {
    Running,
    Stopped,
    Error,
}

/// One server as reported by the supervisor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInfo {
    pub name: String,
    pub status: ServerStatus,
}

impl ServerInfo {
    pub fn new(name: impl Into<String>, status: ServerStatus) -> Self {
        Self {
            name: name.into(),
            status,
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == ServerStatus::Running
    }
}

/// Minimal client operations the router needs from a connected server.
#[async_trait]
pub trait BackendClient: Send {
    async fn list_tools(&mut self) -> Result<Vec<MCPToolSchema>, ToolGateError>;

    async fn call_tool(
        &mut self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<MCPToolCallResult, ToolGateError>;
}

#[async_trait]
impl BackendClient for MCPClient {
    async fn list_tools(&mut self) -> Result<Vec<MCPToolSchema>, ToolGateError> {
        MCPClient::list_tools(self).await
    }

    async fn call_tool(
        &mut self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<MCPToolCallResult, ToolGateError> {
        MCPClient::call_tool(self, name, arguments).await
    }
}

/// Shared handle to a connected backend client.
pub type ClientHandle = Arc<Mutex<Box<dyn BackendClient>>>;

/// Adapter over the external server supervisor.
///
/// `subscribe` delivers a unit signal whenever the topology changes (a
/// server started, stopped, or crashed); receivers treat any signal as
/// "something changed" and re-poll via `all_servers`.
pub trait BackendRegistry: Send + Sync {
    fn all_servers(&self) -> Vec<ServerInfo>;

    fn client(&self, name: &str) -> Option<ClientHandle>;

    fn subscribe(&self) -> broadcast::Receiver<()>;
}

/// Client for the remote meta-service (lowest routing priority).
#[async_trait]
pub trait MetaClient: Send + Sync {
    /// Establish the connection. Failure is non-fatal for the router.
    async fn connect(&self) -> Result<(), ToolGateError>;

    async fn list_tools(&self) -> Result<Vec<MCPToolSchema>, ToolGateError>;

    async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<serde_json::Value, ToolGateError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_info_running_check() {
        assert!(ServerInfo::new("calc", ServerStatus::Running).is_running());
        assert!(!ServerInfo::new("calc", ServerStatus::Stopped).is_running());
        assert!(!ServerInfo::new("calc", ServerStatus::Error).is_running());
    }
}
