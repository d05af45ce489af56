//! MCP client for connecting to backend MCP servers.

use crate::error::ToolGateError;
use rmcp::{
    model::{CallToolRequestParams, CallToolResult, Content, JsonObject, ResourceContents},
    service::{DynService, RoleClient, RunningService, ServiceError},
};

use super::schema::MCPToolSchema;

type DynClientService = Box<dyn DynService<RoleClient>>;
pub type MCPRunningService = RunningService<RoleClient, DynClientService>;

/// Result of a tool call against an MCP server.
#[derive(Debug, Clone)]
pub struct MCPToolCallResult {
    pub structured_content: Option<serde_json::Value>,
    pub text_content: Option<String>,
    pub content: Vec<serde_json::Value>,
}

impl MCPToolCallResult {
    pub fn into_value_or_text(self) -> serde_json::Value {
        if let Some(structured) = self.structured_content {
            return structured;
        }
        if let Some(text) = self.text_content {
            return serde_json::Value::String(text);
        }
        serde_json::Value::Array(self.content)
    }
}

/// Client for a connected MCP server.
///
/// The supervisor hands these out already connected; the initialization
/// handshake is handled by rmcp `serve(...)` before construction.
pub struct MCPClient {
    server: String,
    session: MCPRunningService,
}

impl MCPClient {
    /// Wrap an already-running rmcp service for the named server.
    pub fn from_running_service(server: impl Into<String>, session: MCPRunningService) -> Self {
        Self {
            server: server.into(),
            session,
        }
    }

    pub fn server_name(&self) -> &str {
        &self.server
    }

    pub fn is_closed(&self) -> bool {
        self.session.is_closed()
    }

    /// List available tools from the MCP server.
    pub async fn list_tools(&mut self) -> Result<Vec<MCPToolSchema>, ToolGateError> {
        self.ensure_open()?;

        let tools = match self.session.list_all_tools().await {
            Ok(tools) => tools,
            Err(ServiceError::UnexpectedResponse) => {
                // Some servers reject cursor pagination; fall back to one page.
                let page = self
                    .session
                    .list_tools(None)
                    .await
                    .map_err(|e| map_service_error(&self.server, "list_tools", e))?;
                page.tools
            }
            Err(e) => return Err(map_service_error(&self.server, "list_tools", e)),
        };

        Ok(tools.into_iter().map(map_mcp_tool_schema).collect())
    }

    /// Execute a tool on the MCP server.
    pub async fn call_tool(
        &mut self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<MCPToolCallResult, ToolGateError> {
        self.ensure_open()?;
        let arguments = coerce_tool_arguments(arguments)?;

        let result = self
            .session
            .call_tool(CallToolRequestParams {
                meta: None,
                name: name.to_owned().into(),
                arguments,
                task: None,
            })
            .await
            .map_err(|e| map_service_error(&self.server, "call_tool", e))?;

        map_call_result(name, result)
    }

    fn ensure_open(&self) -> Result<(), ToolGateError> {
        if self.session.is_closed() {
            return Err(ToolGateError::ServerUnavailable(self.server.clone()));
        }
        Ok(())
    }
}

fn map_mcp_tool_schema(tool: rmcp::model::Tool) -> MCPToolSchema {
    MCPToolSchema {
        name: tool.name.to_string(),
        description: tool.description.map(|d| d.to_string()),
        input_schema: serde_json::Value::Object((*tool.input_schema).clone()),
    }
}

fn coerce_tool_arguments(value: serde_json::Value) -> Result<Option<JsonObject>, ToolGateError> {
    match value {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::Object(map) => Ok(Some(map)),
        serde_json::Value::String(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            let parsed: serde_json::Value = serde_json::from_str(trimmed).map_err(|e| {
                ToolGateError::InvalidArgument(format!(
                    "MCP tool arguments must be valid JSON: {e}"
                ))
            })?;
            coerce_tool_arguments(parsed)
        }
        other => Err(ToolGateError::InvalidArgument(format!(
            "MCP tool arguments must be a JSON object; got {other}"
        ))),
    }
}

fn extract_text_content(content: &[Content]) -> Option<String> {
    let mut lines = Vec::new();
    for item in content {
        if let Some(text) = item.as_text() {
            lines.push(text.text.clone());
            continue;
        }
        if let Some(resource) = item.as_resource() {
            if let ResourceContents::TextResourceContents { text, .. } = &resource.resource {
                lines.push(text.clone());
            }
        }
    }

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

fn map_call_result(name: &str, result: CallToolResult) -> Result<MCPToolCallResult, ToolGateError> {
    let text_content = extract_text_content(&result.content);
    let content = result
        .content
        .iter()
        .filter_map(|item| serde_json::to_value(item).ok())
        .collect::<Vec<_>>();

    if result.is_error.unwrap_or(false) {
        let message = result
            .structured_content
            .as_ref()
            .map(|v| v.to_string())
            .or_else(|| text_content.clone())
            .unwrap_or_else(|| "MCP tool returned an error result".into());

        return Err(ToolGateError::ToolExecution {
            tool_name: name.to_string(),
            message,
        });
    }

    Ok(MCPToolCallResult {
        structured_content: result.structured_content,
        text_content,
        content,
    })
}

fn map_service_error(server: &str, context: &str, error: ServiceError) -> ToolGateError {
    match error {
        ServiceError::McpError(error) => ToolGateError::Backend {
            server: server.to_owned(),
            message: format!("{context}: MCP error {}: {}", error.code.0, error.message),
        },
        ServiceError::TransportSend(error) => {
            ToolGateError::Transport(format!("{context}: MCP transport send failed: {error}"))
        }
        ServiceError::TransportClosed => {
            ToolGateError::Transport(format!("{context}: MCP transport closed"))
        }
        ServiceError::UnexpectedResponse => ToolGateError::Backend {
            server: server.to_owned(),
            message: format!("{context}: unexpected MCP response"),
        },
        ServiceError::Cancelled { reason } => {
            let suffix = reason
                .as_deref()
                .map(|r| format!(" ({r})"))
                .unwrap_or_default();
            ToolGateError::Transport(format!("{context}: MCP request cancelled{suffix}"))
        }
        ServiceError::Timeout { timeout } => ToolGateError::Timeout(timeout.as_millis() as u64),
        other => ToolGateError::Backend {
            server: server.to_owned(),
            message: format!("{context}: MCP service error: {other}"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn coerce_tool_arguments_accepts_object_and_stringified_object() {
        let from_obj = coerce_tool_arguments(json!({"city":"nyc"}))
            .expect("object arguments should parse")
            .expect("object should be present");
        assert_eq!(from_obj.get("city"), Some(&json!("nyc")));

        let from_str = coerce_tool_arguments(json!(r#"{"city":"la"}"#))
            .expect("stringified object should parse")
            .expect("object should be present");
        assert_eq!(from_str.get("city"), Some(&json!("la")));
    }

    #[test]
    fn coerce_tool_arguments_rejects_non_object() {
        let err =
            coerce_tool_arguments(json!(["bad"])).expect_err("array arguments should be rejected");
        assert!(matches!(err, ToolGateError::InvalidArgument(_)));
    }

    #[test]
    fn coerce_tool_arguments_rejects_malformed_json_string() {
        let err = coerce_tool_arguments(json!(r#"{"city":"nyc""#))
            .expect_err("malformed JSON string should be rejected");
        assert!(
            matches!(err, ToolGateError::InvalidArgument(message) if message.contains("valid JSON"))
        );
    }

    #[test]
    fn map_mcp_tool_schema_copies_fields() {
        let mut schema = serde_json::Map::new();
        schema.insert("type".into(), json!("object"));
        let tool = rmcp::model::Tool::new("weather", "lookup weather", schema);

        let mapped = map_mcp_tool_schema(tool);
        assert_eq!(mapped.name, "weather");
        assert_eq!(mapped.description.as_deref(), Some("lookup weather"));
        assert_eq!(mapped.input_schema["type"], "object");
    }

    #[test]
    fn map_service_error_timeout_maps_to_timeout_error() {
        let err = map_service_error(
            "calc",
            "call_tool",
            ServiceError::Timeout {
                timeout: Duration::from_millis(2750),
            },
        );
        assert!(matches!(err, ToolGateError::Timeout(2750)));
    }

    #[test]
    fn map_service_error_protocol_violation_names_server() {
        let err = map_service_error("calc", "list_tools", ServiceError::UnexpectedResponse);
        assert!(matches!(
            err,
            ToolGateError::Backend { server, message }
            if server == "calc" && message.contains("unexpected MCP response")
        ));
    }

    #[test]
    fn map_call_result_returns_tool_execution_error_for_error_payload() {
        let result: CallToolResult = serde_json::from_value(json!({
            "content": [
                { "type": "text", "text": "tool failed at runtime" }
            ],
            "structuredContent": {
                "code": "TOOL_FAILURE"
            },
            "isError": true
        }))
        .expect("fixture call result should deserialize");

        let err = map_call_result("search_docs", result)
            .expect_err("error result should map to tool execution error");
        assert!(matches!(
            err,
            ToolGateError::ToolExecution { tool_name, message }
            if tool_name == "search_docs" && message.contains("TOOL_FAILURE")
        ));
    }

    #[test]
    fn into_value_or_text_prefers_structured_content() {
        let result = MCPToolCallResult {
            structured_content: Some(json!({"sum": 5})),
            text_content: Some("5".into()),
            content: Vec::new(),
        };
        assert_eq!(result.into_value_or_text(), json!({"sum": 5}));

        let result = MCPToolCallResult {
            structured_content: None,
            text_content: Some("5".into()),
            content: Vec::new(),
        };
        assert_eq!(result.into_value_or_text(), json!("5"));
    }
}
