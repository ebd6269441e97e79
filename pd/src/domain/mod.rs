//! Domain records shared across the engine

mod approval;
mod cycle;
mod turn;

pub use approval::ApprovalToken;
pub use cycle::{CycleAction, CycleStatus, CycleSummary};
pub use turn::{AgentResponse, CallError, ErrorKind, ToolCallRecord, TurnStatus};
