//! Chat-with-tools orchestration

mod orchestrator;

pub use orchestrator::{Orchestrator, TurnRequest};
