//! Chain step types and data-flow helpers for `mcp_chain`.
//!
//! A chain is strictly sequential: the (optionally JSONPath-extracted)
//! output of step *i* is threaded into step *i+1*'s arguments by textually
//! replacing the `CHAIN_RESULT` sentinel. The textual substitution is a
//! pinned compatibility contract, including the single-scalar unwrap when a
//! JSONPath expression yields exactly one match.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sentinel token replaced with the previous step's output.
pub const CHAIN_SENTINEL: &str = "CHAIN_RESULT";

/// One step of a tool chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainStep {
    #[serde(rename = "toolName")]
    pub tool_name: String,
    /// JSON-encoded argument template, may contain [`CHAIN_SENTINEL`].
    #[serde(rename = "toolArgs")]
    pub tool_args: String,
    /// JSONPath applied to the previous step's output before substitution.
    #[serde(rename = "inputPath", skip_serializing_if = "Option::is_none")]
    pub input_path: Option<String>,
    /// JSONPath applied to this step's output before storing it.
    #[serde(rename = "outputPath", skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
}

/// Arguments accepted by the `mcp_chain` tool.
#[derive(Debug, Clone, Deserialize)]
pub struct ChainArgs {
    #[serde(rename = "mcpPath")]
    pub mcp_path: Vec<ChainStep>,
}

/// Trace entry recorded per executed step.
#[derive(Debug, Clone, Serialize)]
pub struct ChainTraceEntry {
    pub step: usize,
    pub tool: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Apply a JSONPath expression to a running chain value.
///
/// String values are parsed as JSON first so text tool output can be
/// navigated. Every failure mode (parse error, bad path, no matches) is
/// logged and swallowed; the raw value flows through unmodified.
pub fn apply_json_path(raw: &Value, path: &str) -> Value {
    let document = match raw {
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(parsed) => parsed,
            Err(_) => raw.clone(),
        },
        other => other.clone(),
    };

    let matches = match jsonpath_lib::select(&document, path) {
        Ok(matches) => matches,
        Err(e) => {
            tracing::warn!(path, error = %e, "JSONPath extraction failed, using raw value");
            return raw.clone();
        }
    };

    match matches.len() {
        0 => {
            tracing::warn!(path, "JSONPath matched nothing, using raw value");
            raw.clone()
        }
        1 => matches[0].clone(),
        _ => Value::Array(matches.into_iter().cloned().collect()),
    }
}

/// Textually substitute the previous step's value into an argument template.
///
/// Quoted occurrences (`"CHAIN_RESULT"`) are replaced with a valid JSON
/// literal so objects and numbers splice in structurally; remaining bare
/// occurrences get the plain string form (inside larger strings).
pub fn substitute_chain_result(template: &str, value: &Value) -> String {
    let quoted_sentinel = format!("\"{CHAIN_SENTINEL}\"");
    let literal = match serde_json::to_string(value) {
        Ok(json) => json,
        Err(_) => Value::Null.to_string(),
    };
    let plain = match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    };

    template
        .replace(&quoted_sentinel, &literal)
        .replace(CHAIN_SENTINEL, &plain)
}
