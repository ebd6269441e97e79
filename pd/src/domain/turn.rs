//! Turn-level records: the tool call trace and the final agent response

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Normalized error kind recorded on a failed tool call
///
/// These are diagnostic identifiers for the structured trace; the final
/// response text paraphrases them and never shows them to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UnknownTool,
    InvalidArguments,
    PolicyDenied,
    ApprovalRequired,
    Collaborator,
    Timeout,
}

/// Error half of a tool call record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallError {
    pub kind: ErrorKind,
    pub message: String,
}

/// One tool invocation as recorded in the turn trace
///
/// Created once when the invocation resolves and never mutated afterwards.
/// Exactly one of result/error is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRecord {
    pub tool_name: String,
    pub arguments: serde_json::Value,
    pub result: Option<String>,
    pub error: Option<CallError>,
    pub timestamp: DateTime<Utc>,

    /// Position within the turn (0-based, invocation order)
    pub sequence: u32,
}

impl ToolCallRecord {
    /// Record a successful invocation
    pub fn succeeded(tool_name: impl Into<String>, arguments: serde_json::Value, result: String, sequence: u32) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments,
            result: Some(result),
            error: None,
            timestamp: Utc::now(),
            sequence,
        }
    }

    /// Record a failed or policy-gated invocation
    pub fn failed(
        tool_name: impl Into<String>,
        arguments: serde_json::Value,
        kind: ErrorKind,
        message: impl Into<String>,
        sequence: u32,
    ) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments,
            result: None,
            error: Some(CallError {
                kind,
                message: message.into(),
            }),
            timestamp: Utc::now(),
            sequence,
        }
    }

    /// Whether the handler ran and returned a result
    pub fn is_success(&self) -> bool {
        self.result.is_some()
    }

    /// Whether the handler was actually invoked for this call
    ///
    /// True for successes and for failures that happened mid-execution;
    /// false when the call never reached its handler (unknown tool, bad
    /// arguments, policy verdicts).
    pub fn was_executed(&self) -> bool {
        self.result.is_some()
            || matches!(
                self.error,
                Some(CallError {
                    kind: ErrorKind::Collaborator | ErrorKind::Timeout,
                    ..
                })
            )
    }

    /// Whether this call was stopped by the safety policy
    pub fn is_policy_gated(&self) -> bool {
        matches!(
            self.error,
            Some(CallError {
                kind: ErrorKind::PolicyDenied | ErrorKind::ApprovalRequired,
                ..
            })
        )
    }
}

/// How a chat turn ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnStatus {
    /// The model produced a final answer
    Completed,

    /// The iteration cap was hit before a final answer
    MaxIterationsReached,

    /// At least one requested action was denied or needs approval
    Denied,

    /// The caller's stop signal ended the turn early
    Cancelled,
}

impl std::fmt::Display for TurnStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::MaxIterationsReached => write!(f, "max_iterations_reached"),
            Self::Denied => write!(f, "denied"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// The finished product of one chat turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResponse {
    /// Final natural-language answer
    pub response: String,

    /// Ordered trace of tool calls made this turn (invocation order)
    pub tool_calls: Vec<ToolCallRecord>,

    pub status: TurnStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_succeeded_record() {
        let record = ToolCallRecord::succeeded("get_inventory_items", json!({}), "[]".to_string(), 0);
        assert!(record.is_success());
        assert!(!record.is_policy_gated());
        assert!(record.error.is_none());
    }

    #[test]
    fn test_failed_record_carries_kind() {
        let record = ToolCallRecord::failed(
            "place_order",
            json!({"item_name": "rice"}),
            ErrorKind::ApprovalRequired,
            "approval required",
            1,
        );
        assert!(!record.is_success());
        assert!(record.is_policy_gated());
        assert_eq!(record.error.as_ref().unwrap().kind, ErrorKind::ApprovalRequired);
        assert_eq!(record.sequence, 1);
    }

    #[test]
    fn test_collaborator_error_is_not_policy_gated() {
        let record = ToolCallRecord::failed("place_order", json!({}), ErrorKind::Collaborator, "vendor down", 0);
        assert!(!record.is_policy_gated());
        assert!(record.was_executed(), "handler ran before the collaborator failed");
    }

    #[test]
    fn test_gated_and_invalid_calls_were_not_executed() {
        let gated = ToolCallRecord::failed("place_order", json!({}), ErrorKind::ApprovalRequired, "needs approval", 0);
        assert!(!gated.was_executed());

        let invalid = ToolCallRecord::failed("place_order", json!({}), ErrorKind::InvalidArguments, "missing", 1);
        assert!(!invalid.was_executed());
    }

    #[test]
    fn test_error_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::ApprovalRequired).unwrap();
        assert_eq!(json, "\"approval_required\"");
    }

    #[test]
    fn test_agent_response_roundtrip() {
        let response = AgentResponse {
            response: "You have 3 items.".to_string(),
            tool_calls: vec![ToolCallRecord::succeeded("get_inventory_items", json!({}), "3 items".to_string(), 0)],
            status: TurnStatus::Completed,
        };

        let json = serde_json::to_string(&response).unwrap();
        let parsed: AgentResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.status, TurnStatus::Completed);
        assert_eq!(parsed.tool_calls.len(), 1);
    }
}
