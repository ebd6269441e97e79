//! Approval tokens from the human-in-the-loop channel

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Evidence that a human authorized a specific mutating or financial action
///
/// Tokens are minted outside the engine (the approval channel) and attached to
/// a turn request when the action is re-submitted. A token is scoped to one
/// tool name; it never overrides a hard guardrail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalToken {
    /// Tool name this token authorizes
    pub tool: String,

    /// Who granted the approval
    pub granted_by: String,

    pub granted_at: DateTime<Utc>,
}

impl ApprovalToken {
    pub fn new(tool: impl Into<String>, granted_by: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            granted_by: granted_by.into(),
            granted_at: Utc::now(),
        }
    }

    /// Whether this token covers the named tool
    pub fn covers(&self, tool_name: &str) -> bool {
        self.tool == tool_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_covers_only_its_tool() {
        let token = ApprovalToken::new("place_order", "cli");
        assert!(token.covers("place_order"));
        assert!(!token.covers("set_preference"));
    }
}
