//! Normalized tool call result shape.

use serde::{Deserialize, Serialize};

/// One content item in a tool call result. Only text items are produced
/// by the router; backends may return richer items which pass through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

impl ContentItem {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: "text".into(),
            text: text.into(),
        }
    }
}

/// Uniform result shape returned to callers for every tool call.
///
/// Callers inspect `is_error` rather than relying on exceptions; the
/// dispatcher guarantees a well-formed value for every outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallResult {
    pub content: Vec<ContentItem>,
    #[serde(rename = "isError", skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
    /// Chain execution trace; present only on `mcp_chain` results.
    #[serde(rename = "_trace", skip_serializing_if = "Option::is_none")]
    pub trace: Option<serde_json::Value>,
}

impl ToolCallResult {
    /// A successful text result.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentItem::text(text)],
            is_error: None,
            trace: None,
        }
    }

    /// An error result with a human-readable message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ContentItem::text(message)],
            is_error: Some(true),
            trace: None,
        }
    }

    /// Normalize an arbitrary backend value. A value already carrying a
    /// `content` array passes through; anything else is wrapped as
    /// JSON-stringified text.
    pub fn from_value(value: serde_json::Value) -> Self {
        if value.get("content").map(|c| c.is_array()).unwrap_or(false) {
            if let Ok(result) = serde_json::from_value::<ToolCallResult>(value.clone()) {
                return result;
            }
        }
        match value {
            serde_json::Value::String(text) => Self::text(text),
            other => Self::text(other.to_string()),
        }
    }

    /// Whether the result reports an error.
    pub fn failed(&self) -> bool {
        self.is_error.unwrap_or(false)
    }

    /// Concatenated text content, used when threading chain output.
    pub fn text_content(&self) -> String {
        self.content
            .iter()
            .filter(|item| item.kind == "text")
            .map(|item| item.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Attach a chain trace.
    pub fn with_trace(mut self, trace: serde_json::Value) -> Self {
        self.trace = Some(trace);
        self
    }
}
