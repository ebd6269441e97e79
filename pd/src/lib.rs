//! pantryd - policy-gated tool-calling agent for household inventory
//!
//! The engine turns one user (or system-generated) message into zero or more
//! tool invocations against the household inventory store, feeding results
//! back into the model's context until it produces a final answer. A safety
//! policy separates informational reads from mutating and financial actions:
//! the former always run, the latter need a human approval token, and hard
//! guardrails deny outright regardless of approval.
//!
//! # Modules
//!
//! - [`tools`] - tool trait, registry, executor, and the built-in inventory tools
//! - [`policy`] - the pure safety-policy decision function
//! - [`agent`] - the chat-with-tools orchestration loop
//! - [`cycle`] - the unattended restock-check runner
//! - [`events`] - broadcast bus for lifecycle notifications
//! - [`llm`] - model client trait and Anthropic implementation
//! - [`state`] - actor-owned handle to the pantry store
//! - [`vendor`] - ordering client used by financial tools

pub mod agent;
pub mod cli;
pub mod config;
pub mod cycle;
pub mod domain;
pub mod events;
pub mod llm;
pub mod policy;
pub mod state;
pub mod tools;
pub mod vendor;

// Re-export commonly used types
pub use agent::{Orchestrator, TurnRequest};
pub use config::{AgentConfig, Config, CycleConfig, LlmConfig, PolicyConfig, StorageConfig, VendorConfig};
pub use cycle::CycleRunner;
pub use domain::{
    AgentResponse, ApprovalToken, CallError, CycleAction, CycleStatus, CycleSummary, ErrorKind, ToolCallRecord,
    TurnStatus,
};
pub use events::{AgentEvent, EventBus, EventEmitter, create_event_bus};
pub use llm::{AnthropicClient, CompletionRequest, CompletionResponse, LlmClient, LlmError, create_client};
pub use policy::{PolicyDecision, SafetyPolicy, Verdict};
pub use state::{StateError, StateManager};
pub use tools::{Classification, Tool, ToolContext, ToolError, ToolExecutor, ToolRegistry, standard_registry};
pub use vendor::{HttpVendorClient, OrderConfirmation, OrderRequest, VendorClient, VendorError};
