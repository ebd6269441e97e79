//! Tool error types

use thiserror::Error;

use crate::domain::ErrorKind;
use crate::state::StateError;
use crate::vendor::VendorError;

/// Errors that can occur while registering or executing tools
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {name}")]
    UnknownTool { name: String },

    #[error("Duplicate tool name: {name}")]
    DuplicateName { name: String },

    #[error("Invalid arguments: {}", violations.join("; "))]
    InvalidArguments { violations: Vec<String> },

    #[error("Denied by policy: {reason}")]
    PolicyDenied { reason: String },

    #[error("Approval required: {reason}")]
    ApprovalRequired { reason: String },

    #[error("Collaborator failure: {message}")]
    Collaborator { message: String, transient: bool },

    #[error("Handler timed out after {timeout_ms}ms")]
    HandlerTimeout { timeout_ms: u64 },
}

impl ToolError {
    /// Project into the normalized kind recorded on the tool call trace
    pub fn kind(&self) -> ErrorKind {
        match self {
            ToolError::UnknownTool { .. } | ToolError::DuplicateName { .. } => ErrorKind::UnknownTool,
            ToolError::InvalidArguments { .. } => ErrorKind::InvalidArguments,
            ToolError::PolicyDenied { .. } => ErrorKind::PolicyDenied,
            ToolError::ApprovalRequired { .. } => ErrorKind::ApprovalRequired,
            ToolError::Collaborator { .. } => ErrorKind::Collaborator,
            ToolError::HandlerTimeout { .. } => ErrorKind::Timeout,
        }
    }

    /// Whether the orchestrator should retry this failure
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ToolError::Collaborator { transient: true, .. } | ToolError::HandlerTimeout { .. }
        )
    }
}

impl From<StateError> for ToolError {
    fn from(e: StateError) -> Self {
        ToolError::Collaborator {
            transient: e.is_transient(),
            message: e.to_string(),
        }
    }
}

impl From<VendorError> for ToolError {
    fn from(e: VendorError) -> Self {
        ToolError::Collaborator {
            transient: e.is_transient(),
            message: e.to_string(),
        }
    }
}
