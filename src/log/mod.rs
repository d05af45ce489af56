//! Write-only invocation log contract.
//!
//! The router emits a request record before each backend dispatch and a
//! response-or-error record after it. Sinks must never fail the call;
//! anything expensive belongs behind a channel inside the sink.

use serde::{Deserialize, Serialize};

/// Character-per-token ratio for best-effort token estimation.
const CHARS_PER_TOKEN: usize = 4;

/// Kind of invocation record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvocationKind {
    Request,
    Response,
    Error,
}

/// One invocation log record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationRecord {
    pub kind: InvocationKind,
    /// Tool name as the caller requested it.
    pub tool: String,
    /// Backend that owned the call ("internal", a server name, or "metamcp").
    pub server: String,
    /// Request arguments, response payload, or error message.
    pub payload: serde_json::Value,
    /// Approximate token count for the payload; never authoritative.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<u64>,
    /// Monetary cost if the sink computes one; the router leaves this unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
}

impl InvocationRecord {
    pub fn request(tool: &str, server: &str, args: &serde_json::Value) -> Self {
        Self {
            kind: InvocationKind::Request,
            tool: tool.to_owned(),
            server: server.to_owned(),
            payload: args.clone(),
            tokens: Some(estimate_tokens(args)),
            cost: None,
        }
    }

    pub fn response(tool: &str, server: &str, result: &serde_json::Value) -> Self {
        Self {
            kind: InvocationKind::Response,
            tool: tool.to_owned(),
            server: server.to_owned(),
            payload: result.clone(),
            tokens: Some(estimate_tokens(result)),
            cost: None,
        }
    }

    pub fn error(tool: &str, server: &str, message: &str) -> Self {
        Self {
            kind: InvocationKind::Error,
            tool: tool.to_owned(),
            server: server.to_owned(),
            payload: serde_json::Value::String(message.to_owned()),
            tokens: None,
            cost: None,
        }
    }
}

/// Destination for invocation records.
pub trait InvocationSink: Send + Sync {
    fn record(&self, record: InvocationRecord);
}

/// Default sink: structured `tracing` events.
#[derive(Debug, Default)]
pub struct TracingSink;

impl InvocationSink for TracingSink {
    fn record(&self, record: InvocationRecord) {
        match record.kind {
            InvocationKind::Request => tracing::info!(
                tool = %record.tool,
                server = %record.server,
                tokens = ?record.tokens,
                "tool call request"
            ),
            InvocationKind::Response => tracing::info!(
                tool = %record.tool,
                server = %record.server,
                tokens = ?record.tokens,
                "tool call response"
            ),
            InvocationKind::Error => tracing::warn!(
                tool = %record.tool,
                server = %record.server,
                error = %record.payload,
                "tool call error"
            ),
        }
    }
}

/// Approximate token count for a JSON payload (length / 4).
pub fn estimate_tokens(payload: &serde_json::Value) -> u64 {
    let chars = match payload {
        serde_json::Value::String(text) => text.len(),
        other => other.to_string().len(),
    };
    (chars / CHARS_PER_TOKEN) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn estimate_uses_raw_string_length() {
        assert_eq!(estimate_tokens(&json!("abcdefgh")), 2);
        assert_eq!(estimate_tokens(&json!("abc")), 0);
    }

    #[test]
    fn request_record_carries_token_estimate() {
        let record = InvocationRecord::request("echo", "internal", &json!({"text": "hello"}));
        assert_eq!(record.kind, InvocationKind::Request);
        assert_eq!(record.server, "internal");
        assert!(record.tokens.is_some());
        assert!(record.cost.is_none());
    }

    #[test]
    fn error_record_skips_token_estimate() {
        let record = InvocationRecord::error("echo", "calc", "server not connected");
        assert_eq!(record.kind, InvocationKind::Error);
        assert!(record.tokens.is_none());
    }
}
