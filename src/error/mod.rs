//! Error types for Toolgate.

use thiserror::Error;

/// Primary error type for all Toolgate operations.
#[derive(Error, Debug)]
pub enum ToolGateError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Tool blocked by policy: {0}")]
    PolicyBlocked(String),

    #[error("Server not connected: {0}")]
    ServerUnavailable(String),

    #[error("Tool execution error: {tool_name}: {message}")]
    ToolExecution { tool_name: String, message: String },

    #[error("Backend error: {server}: {message}")]
    Backend { server: String, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Broad error category mirroring the dispatcher's failure taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    NotFound,
    PolicyBlocked,
    BackendUnavailable,
    BackendError,
    InvalidInput,
    Configuration,
    Unknown,
}

impl ToolGateError {
    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ToolNotFound(_) => ErrorCategory::NotFound,
            Self::PolicyBlocked(_) => ErrorCategory::PolicyBlocked,
            Self::ServerUnavailable(_) => ErrorCategory::BackendUnavailable,
            Self::ToolExecution { .. }
            | Self::Backend { .. }
            | Self::Transport(_)
            | Self::Timeout(_) => ErrorCategory::BackendError,
            Self::InvalidArgument(_) | Self::Serialization(_) => ErrorCategory::InvalidInput,
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::InvalidState(_) => ErrorCategory::Unknown,
        }
    }

    /// Whether the failure is terminal for the call (no refresh retry will
    /// change the outcome within the same dispatch).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::NotFound
                | ErrorCategory::PolicyBlocked
                | ErrorCategory::BackendUnavailable
                | ErrorCategory::InvalidInput
        )
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, ToolGateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_maps_dispatch_taxonomy() {
        assert_eq!(
            ToolGateError::ToolNotFound("x".into()).category(),
            ErrorCategory::NotFound
        );
        assert_eq!(
            ToolGateError::PolicyBlocked("x".into()).category(),
            ErrorCategory::PolicyBlocked
        );
        assert_eq!(
            ToolGateError::ServerUnavailable("calc".into()).category(),
            ErrorCategory::BackendUnavailable
        );
        assert_eq!(
            ToolGateError::ToolExecution {
                tool_name: "x".into(),
                message: "boom".into()
            }
            .category(),
            ErrorCategory::BackendError
        );
    }

    #[test]
    fn terminal_errors_exclude_backend_failures() {
        let err = ToolGateError::Backend {
            server: "calc".into(),
            message: "crashed".into(),
        };
        assert!(!err.is_terminal());
        assert!(ToolGateError::ToolNotFound("x".into()).is_terminal());
    }
}
