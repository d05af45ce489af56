//! Typed access to tool call arguments.

use crate::error::ToolGateError;

/// Wrapper around tool call arguments providing typed extraction.
#[derive(Debug, Clone)]
pub struct ToolArguments {
    value: serde_json::Value,
}

impl ToolArguments {
    pub fn new(value: serde_json::Value) -> Self {
        Self { value }
    }

    /// Get the raw JSON value.
    pub fn raw(&self) -> &serde_json::Value {
        &self.value
    }

    /// Get a string argument by key.
    pub fn get_str(&self, key: &str) -> Result<&str, ToolGateError> {
        self.value
            .get(key)
            .and_then(|v| v.as_str())
            .ok_or_else(|| ToolGateError::InvalidArgument(format!("Missing string argument: {key}")))
    }

    /// Get an optional string argument.
    pub fn get_str_opt(&self, key: &str) -> Option<&str> {
        self.value.get(key).and_then(|v| v.as_str())
    }

    /// Get an integer argument.
    pub fn get_i64(&self, key: &str) -> Result<i64, ToolGateError> {
        self.value
            .get(key)
            .and_then(|v| v.as_i64())
            .ok_or_else(|| {
                ToolGateError::InvalidArgument(format!("Missing integer argument: {key}"))
            })
    }

    /// Get an optional integer argument.
    pub fn get_i64_opt(&self, key: &str) -> Option<i64> {
        self.value.get(key).and_then(|v| v.as_i64())
    }

    /// Get an array argument.
    pub fn get_array(&self, key: &str) -> Result<&Vec<serde_json::Value>, ToolGateError> {
        self.value
            .get(key)
            .and_then(|v| v.as_array())
            .ok_or_else(|| ToolGateError::InvalidArgument(format!("Missing array argument: {key}")))
    }

    /// Deserialize the entire arguments into a typed struct.
    ///
    /// String-encoded JSON is parsed first so handlers accept both shapes.
    pub fn deserialize<T: serde::de::DeserializeOwned>(&self) -> Result<T, ToolGateError> {
        let value = match &self.value {
            serde_json::Value::String(raw) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    serde_json::json!({})
                } else {
                    serde_json::from_str::<serde_json::Value>(trimmed).map_err(|e| {
                        ToolGateError::InvalidArgument(format!(
                            "Failed to deserialize arguments: {e}"
                        ))
                    })?
                }
            }
            other => other.clone(),
        };
        serde_json::from_value(value).map_err(|e| {
            ToolGateError::InvalidArgument(format!("Failed to deserialize arguments: {e}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn get_str_returns_value_or_error() {
        let args = ToolArguments::new(json!({"name": "echo"}));
        assert_eq!(args.get_str("name").expect("name should exist"), "echo");
        assert!(args.get_str("missing").is_err());
    }

    #[test]
    fn get_i64_opt_returns_none_for_missing() {
        let args = ToolArguments::new(json!({"limit": 10}));
        assert_eq!(args.get_i64_opt("limit"), Some(10));
        assert_eq!(args.get_i64_opt("missing"), None);
    }

    #[test]
    fn deserialize_accepts_string_encoded_json() {
        #[derive(serde::Deserialize)]
        struct Params {
            query: String,
        }

        let args = ToolArguments::new(json!(r#"{"query":"rust"}"#));
        let params: Params = args.deserialize().expect("string JSON should parse");
        assert_eq!(params.query, "rust");
    }
}
