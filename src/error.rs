use crate::content::InvocationResult;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    // Registration Errors
    #[error("Tool already registered: {0}")]
    DuplicateTool(String),

    #[error("Too many tools (max: {0})")]
    TooManyTools(usize),

    // Invocation Errors
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments at '{path}': {message}")]
    Validation { path: String, message: String },

    #[error("Tool handler failed: {0}")]
    Handler(String),

    #[error("Tool '{tool}' timed out after {timeout_ms}ms")]
    Timeout { tool: String, timeout_ms: u64 },

    // Resource Errors
    #[error("Resource template not found: {0}")]
    UnknownResource(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    // Session Errors
    #[error("Too many sessions (max: {0})")]
    TooManySessions(usize),

    #[error("No session bound to this invocation")]
    NoSession,

    // IO Errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // JSON Errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Internal Errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Machine-readable code placed in error envelopes
    pub fn code(&self) -> &'static str {
        match self {
            Self::DuplicateTool(_) => "duplicate_tool",
            Self::TooManyTools(_) => "too_many_tools",
            Self::UnknownTool(_) => "unknown_tool",
            Self::Validation { .. } => "invalid_arguments",
            Self::Handler(_) => "handler_failed",
            Self::Timeout { .. } => "timeout",
            Self::UnknownResource(_) => "unknown_resource",
            Self::InvalidPath(_) => "invalid_path",
            Self::TooManySessions(_) => "too_many_sessions",
            Self::NoSession => "no_session",
            Self::Io(_) => "io_error",
            Self::Json(_) => "json_error",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Registration-time errors abort gateway construction; everything else
    /// is contained within the failing request.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::DuplicateTool(_) | Self::TooManyTools(_))
    }

    /// Convert into a contained invocation result: a human-readable content
    /// block plus a machine-readable error envelope in structured content.
    pub fn into_result(self) -> InvocationResult {
        let mut envelope = json!({
            "error": true,
            "code": self.code(),
            "message": self.to_string(),
        });
        if let Self::Validation { ref path, .. } = self {
            envelope["path"] = json!(path);
        }
        InvocationResult::error(self.to_string()).with_structured(envelope)
    }
}

// Result type alias for convenience
pub type GatewayResult<T> = Result<T, GatewayError>;

// For compatibility with handler code that uses anyhow::Error
impl From<anyhow::Error> for GatewayError {
    fn from(err: anyhow::Error) -> Self {
        GatewayError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_envelope_carries_field_path() {
        let err = GatewayError::Validation {
            path: "board.items[2].id".to_string(),
            message: "expected string".to_string(),
        };
        let result = err.into_result();
        let structured = result.structured_content.unwrap();

        assert_eq!(structured["error"], true);
        assert_eq!(structured["code"], "invalid_arguments");
        assert_eq!(structured["path"], "board.items[2].id");
    }

    #[test]
    fn only_registration_errors_are_fatal() {
        assert!(GatewayError::DuplicateTool("echo".into()).is_fatal());
        assert!(!GatewayError::UnknownTool("echo".into()).is_fatal());
        assert!(!GatewayError::Handler("boom".into()).is_fatal());
        assert!(!GatewayError::Timeout {
            tool: "echo".into(),
            timeout_ms: 100
        }
        .is_fatal());
    }
}
