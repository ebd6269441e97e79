//! Tool trait definition

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ToolError;
use super::context::ToolContext;

/// Safety classification of a tool
///
/// Fixed at registration time. Informational tools are always allowed;
/// mutating and financial tools go through the safety policy on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    /// Read-only; never gated
    Informational,

    /// Changes household state
    Mutating,

    /// Spends money
    Financial,
}

impl Classification {
    /// Whether calls with this classification require policy clearance
    pub fn is_gated(&self) -> bool {
        matches!(self, Classification::Mutating | Classification::Financial)
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Informational => write!(f, "informational"),
            Self::Mutating => write!(f, "mutating"),
            Self::Financial => write!(f, "financial"),
        }
    }
}

/// A tool the model can invoke
///
/// Handlers reach their collaborators through the [`ToolContext`] injected at
/// call time; they never construct a store or vendor client themselves.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name (matches the model's tool_use name)
    fn name(&self) -> &'static str;

    /// Human-readable description offered to the model
    fn description(&self) -> &'static str;

    /// Safety classification, immutable for the life of the registration
    fn classification(&self) -> Classification;

    /// JSON Schema for input parameters
    fn input_schema(&self) -> Value;

    /// Execute the tool
    async fn execute(&self, input: Value, ctx: &ToolContext) -> Result<String, ToolError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gating() {
        assert!(!Classification::Informational.is_gated());
        assert!(Classification::Mutating.is_gated());
        assert!(Classification::Financial.is_gated());
    }

    #[test]
    fn test_display() {
        assert_eq!(Classification::Financial.to_string(), "financial");
    }
}
