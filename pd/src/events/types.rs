//! Event types for agent activity streaming
//!
//! These events cover everything observable from outside the engine: turn
//! lifecycle, per-call execution, approval surfacing, and the autonomous
//! cycle notifications consumed by schedulers and the presentation layer.

use serde::{Deserialize, Serialize};

use crate::domain::CycleSummary;

/// The vocabulary of agent activity
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AgentEvent {
    // === Turn lifecycle ===
    /// A chat turn has started
    TurnStarted { turn_id: String },

    /// A tool call is about to execute
    ToolCallStarted {
        turn_id: String,
        tool_name: String,
        args_summary: String,
    },

    /// A tool call finished (handler ran, successfully or not)
    ToolCallCompleted {
        turn_id: String,
        tool_name: String,
        success: bool,
        result_summary: String,
    },

    /// A requested action is waiting on human approval
    ApprovalRequired {
        turn_id: String,
        tool_name: String,
        reason: String,
    },

    /// A chat turn finished
    TurnCompleted {
        turn_id: String,
        status: String,
        tool_call_count: usize,
    },

    // === Cycle lifecycle ===
    /// An autonomous cycle has started
    CycleStarted { cycle_id: String },

    /// The cycle executed one allowed action
    ActionTaken {
        cycle_id: String,
        action_name: String,
        description: String,
    },

    /// An autonomous cycle finished; the summary is frozen
    CycleCompleted { cycle_id: String, summary: CycleSummary },
}

impl AgentEvent {
    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            AgentEvent::TurnStarted { .. } => "TurnStarted",
            AgentEvent::ToolCallStarted { .. } => "ToolCallStarted",
            AgentEvent::ToolCallCompleted { .. } => "ToolCallCompleted",
            AgentEvent::ApprovalRequired { .. } => "ApprovalRequired",
            AgentEvent::TurnCompleted { .. } => "TurnCompleted",
            AgentEvent::CycleStarted { .. } => "CycleStarted",
            AgentEvent::ActionTaken { .. } => "ActionTaken",
            AgentEvent::CycleCompleted { .. } => "CycleCompleted",
        }
    }

    /// The turn or cycle this event belongs to
    pub fn scope_id(&self) -> &str {
        match self {
            AgentEvent::TurnStarted { turn_id }
            | AgentEvent::ToolCallStarted { turn_id, .. }
            | AgentEvent::ToolCallCompleted { turn_id, .. }
            | AgentEvent::ApprovalRequired { turn_id, .. }
            | AgentEvent::TurnCompleted { turn_id, .. } => turn_id,
            AgentEvent::CycleStarted { cycle_id }
            | AgentEvent::ActionTaken { cycle_id, .. }
            | AgentEvent::CycleCompleted { cycle_id, .. } => cycle_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CycleStatus;

    #[test]
    fn test_event_type_and_scope() {
        let event = AgentEvent::ActionTaken {
            cycle_id: "cycle-7".to_string(),
            action_name: "place_order".to_string(),
            description: "ordered rice".to_string(),
        };
        assert_eq!(event.event_type(), "ActionTaken");
        assert_eq!(event.scope_id(), "cycle-7");
    }

    #[test]
    fn test_cycle_completed_serializes_summary() {
        let summary = CycleSummary::begin().finish(CycleStatus::Skipped);
        let event = AgentEvent::CycleCompleted {
            cycle_id: summary.cycle_id.clone(),
            summary,
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("CycleCompleted"));
        assert!(json.contains("skipped"));

        let parsed: AgentEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.event_type(), "CycleCompleted");
    }
}
