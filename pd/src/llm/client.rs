//! LlmClient trait definition

use async_trait::async_trait;

use super::{CompletionRequest, CompletionResponse, LlmError};

/// Stateless model client - each call is independent
///
/// The orchestrator accumulates the conversation itself and resends it on
/// every call, so implementations hold no conversation state. A call either
/// yields final text, a list of requested tool invocations, or an error whose
/// retryability the caller can inspect.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send one completion request, blocking until the model responds
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;
}
