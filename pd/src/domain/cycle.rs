//! Cycle-level records for autonomous runs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How an autonomous cycle ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleStatus {
    /// The decision turn ran to completion
    Completed,

    /// Nothing was actionable; no model call was made
    Skipped,

    /// A collaborator failed unrecoverably mid-cycle
    Failed,

    /// The stop signal ended the cycle early
    Cancelled,
}

impl std::fmt::Display for CycleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::Skipped => write!(f, "skipped"),
            Self::Failed => write!(f, "failed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// One executed action within a cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleAction {
    pub action_name: String,
    pub description: String,
}

/// Summary of one autonomous cycle
///
/// Owned and mutated only by the cycle runner while the cycle is in flight;
/// frozen at completion and handed to listeners by value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleSummary {
    pub cycle_id: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,

    /// Executed actions, in execution order
    pub actions: Vec<CycleAction>,

    pub status: CycleStatus,
}

impl CycleSummary {
    /// Start a new cycle summary with a fresh ID
    pub fn begin() -> Self {
        Self {
            cycle_id: Uuid::now_v7().to_string(),
            started_at: Utc::now(),
            completed_at: None,
            actions: Vec::new(),
            status: CycleStatus::Completed,
        }
    }

    /// Freeze the summary with a final status
    pub fn finish(mut self, status: CycleStatus) -> Self {
        self.status = status;
        self.completed_at = Some(Utc::now());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_and_finish() {
        let summary = CycleSummary::begin();
        assert!(summary.completed_at.is_none());
        assert!(summary.actions.is_empty());

        let summary = summary.finish(CycleStatus::Skipped);
        assert_eq!(summary.status, CycleStatus::Skipped);
        assert!(summary.completed_at.is_some());
        assert!(summary.completed_at.unwrap() >= summary.started_at);
    }

    #[test]
    fn test_cycle_ids_are_unique() {
        let a = CycleSummary::begin();
        let b = CycleSummary::begin();
        assert_ne!(a.cycle_id, b.cycle_id);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(CycleStatus::Skipped.to_string(), "skipped");
        assert_eq!(CycleStatus::Cancelled.to_string(), "cancelled");
    }
}
