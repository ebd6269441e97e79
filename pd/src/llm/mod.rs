//! Model client module
//!
//! The orchestrator only sees the [`LlmClient`] trait; the Anthropic
//! implementation lives here alongside the wire types.

mod anthropic;
pub mod client;
mod error;
mod types;

pub use anthropic::AnthropicClient;
pub use client::LlmClient;
pub use error::LlmError;
pub use types::{
    CompletionRequest, CompletionResponse, ContentBlock, Message, MessageContent, RequestedToolCall, Role, StopReason,
    TokenUsage, ToolDefinition,
};

use std::sync::Arc;

use crate::config::LlmConfig;

/// Create a model client for the provider named in config
pub fn create_client(config: &LlmConfig) -> Result<Arc<dyn LlmClient>, LlmError> {
    match config.provider.as_str() {
        "anthropic" => Ok(Arc::new(AnthropicClient::from_config(config)?)),
        other => Err(LlmError::InvalidResponse(format!(
            "Unknown LLM provider: '{}'. Supported: anthropic",
            other
        ))),
    }
}
