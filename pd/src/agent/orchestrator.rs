//! Orchestrator - the chat-with-tools loop
//!
//! Drives one turn: send the accumulated conversation to the model, execute
//! (or policy-gate) whatever tool invocations come back, feed the results
//! into the context, and repeat until the model produces a final answer or
//! the iteration cap is hit. Every tool call is policy-checked individually,
//! so a multi-tool batch cannot smuggle a mutating action alongside
//! informational ones.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::AgentConfig;
use crate::domain::{AgentResponse, ApprovalToken, ErrorKind, ToolCallRecord, TurnStatus};
use crate::events::EventEmitter;
use crate::llm::{CompletionRequest, CompletionResponse, ContentBlock, LlmClient, Message, RequestedToolCall};
use crate::policy::{SafetyPolicy, Verdict};
use crate::state::StateManager;
use crate::tools::{ToolContext, ToolError, ToolExecutor, ToolRegistry};
use crate::vendor::VendorClient;

/// Result summaries fed back to the model are capped at this length
const RESULT_SUMMARY_MAX: usize = 200;

/// One request into the chat-with-tools loop
#[derive(Debug, Clone, Default)]
pub struct TurnRequest {
    /// The user (or system-generated) message
    pub message: String,

    /// Override the default system prompt
    pub system_prompt: Option<String>,

    /// Approval token from the human-in-the-loop channel, if any
    pub approval: Option<ApprovalToken>,

    /// Override the configured iteration cap
    pub max_iterations: Option<u32>,
}

impl TurnRequest {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_approval(mut self, approval: ApprovalToken) -> Self {
        self.approval = Some(approval);
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }
}

/// Loop states for one turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TurnState {
    AwaitingModel,
    AwaitingToolResult,
    Done(TurnStatus),
}

/// The chat-with-tools orchestrator
pub struct Orchestrator {
    llm: Arc<dyn LlmClient>,
    registry: Arc<ToolRegistry>,
    executor: ToolExecutor,
    policy: SafetyPolicy,
    store: StateManager,
    vendor: Option<Arc<dyn VendorClient>>,
    config: AgentConfig,
    max_tokens: u32,
}

impl Orchestrator {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        registry: Arc<ToolRegistry>,
        policy: SafetyPolicy,
        store: StateManager,
        config: AgentConfig,
        max_tokens: u32,
    ) -> Self {
        debug!(max_iterations = config.max_iterations, tools = registry.len(), "Orchestrator::new");
        let executor = ToolExecutor::new(registry.clone(), Duration::from_millis(config.tool_timeout_ms));
        Self {
            llm,
            registry,
            executor,
            policy,
            store,
            vendor: None,
            config,
            max_tokens,
        }
    }

    /// Attach a vendor client for financial tools
    pub fn with_vendor(mut self, vendor: Arc<dyn VendorClient>) -> Self {
        self.vendor = Some(vendor);
        self
    }

    /// Run one chat turn to completion
    ///
    /// The contract is synchronous-looking: request in, [`AgentResponse`]
    /// out, or an error when the model collaborator fails unrecoverably.
    /// Callers wanting background execution spawn this on their own task.
    pub async fn chat_with_tools(&self, request: TurnRequest) -> eyre::Result<AgentResponse> {
        self.run_turn(request, None, None).await
    }

    /// Run one chat turn with optional event emission and cancellation
    ///
    /// The cancel signal is observed between iterations and between tool
    /// calls; an in-flight handler is never interrupted.
    pub async fn run_turn(
        &self,
        request: TurnRequest,
        emitter: Option<&EventEmitter>,
        cancel: Option<&watch::Receiver<bool>>,
    ) -> eyre::Result<AgentResponse> {
        let turn_id = emitter
            .map(|e| e.turn_id().to_string())
            .unwrap_or_else(|| Uuid::now_v7().to_string());
        let max_iterations = request.max_iterations.unwrap_or(self.config.max_iterations).max(1);
        debug!(%turn_id, max_iterations, "run_turn: called");

        let system_prompt = request
            .system_prompt
            .clone()
            .unwrap_or_else(|| default_system_prompt().to_string());

        let mut ctx = ToolContext::new(self.store.clone(), &turn_id);
        if let Some(vendor) = &self.vendor {
            ctx = ctx.with_vendor(vendor.clone());
        }

        if let Some(e) = emitter {
            e.turn_started();
        }

        let manifest = self.registry.manifest();
        let mut messages = vec![Message::user(&request.message)];
        let mut trace: Vec<ToolCallRecord> = Vec::new();
        let mut final_text: Option<String> = None;
        let mut pending_calls: Vec<RequestedToolCall> = Vec::new();
        let mut iterations = 0u32;
        let mut state = TurnState::AwaitingModel;

        let status = loop {
            match state {
                TurnState::AwaitingModel => {
                    if is_cancelled(cancel) {
                        debug!(%turn_id, "run_turn: cancelled before model call");
                        break TurnStatus::Cancelled;
                    }
                    if iterations >= max_iterations {
                        debug!(%turn_id, iterations, "run_turn: iteration cap reached");
                        break TurnStatus::MaxIterationsReached;
                    }
                    iterations += 1;

                    let completion = CompletionRequest {
                        system_prompt: system_prompt.clone(),
                        messages: messages.clone(),
                        tools: manifest.clone(),
                        max_tokens: self.max_tokens,
                    };
                    let response = self.call_model(completion, &turn_id).await?;
                    debug!(%turn_id, iterations, tool_calls = response.tool_calls.len(), "run_turn: model responded");

                    messages.push(build_assistant_message(&response));

                    if response.tool_calls.is_empty() {
                        final_text = response.content;
                        state = TurnState::Done(TurnStatus::Completed);
                    } else {
                        pending_calls = response.tool_calls;
                        state = TurnState::AwaitingToolResult;
                    }
                }
                TurnState::AwaitingToolResult => {
                    // Process the batch in request order; each call gets its
                    // own policy decision
                    let mut result_blocks = Vec::with_capacity(pending_calls.len());
                    let mut cancelled_mid_batch = false;
                    for call in std::mem::take(&mut pending_calls) {
                        if is_cancelled(cancel) {
                            debug!(%turn_id, tool = %call.name, "run_turn: cancelled, skipping remaining calls");
                            cancelled_mid_batch = true;
                            break;
                        }
                        let (record, block) = self
                            .process_call(&call, &ctx, request.approval.as_ref(), trace.len() as u32, emitter)
                            .await;
                        trace.push(record);
                        result_blocks.push(block);
                    }
                    if cancelled_mid_batch {
                        state = TurnState::Done(TurnStatus::Cancelled);
                    } else {
                        messages.push(Message::user_blocks(result_blocks));
                        state = TurnState::AwaitingModel;
                    }
                }
                TurnState::Done(status) => break status,
            }
        };

        // A clean finish downgrades to Denied when the trace carries a
        // policy verdict the caller still has to act on
        let status = match status {
            TurnStatus::Completed if trace.iter().any(|r| r.is_policy_gated()) => TurnStatus::Denied,
            other => other,
        };

        let response_text = finalize_text(status, final_text, &trace);
        if let Some(e) = emitter {
            e.turn_completed(&status.to_string(), trace.len());
        }
        info!(%turn_id, %status, tool_calls = trace.len(), iterations, "Turn finished");

        Ok(AgentResponse {
            response: response_text,
            tool_calls: trace,
            status,
        })
    }

    /// Call the model, retrying transient failures a fixed number of times
    async fn call_model(&self, request: CompletionRequest, turn_id: &str) -> eyre::Result<CompletionResponse> {
        let mut last_error = None;
        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                let backoff = Duration::from_millis(200 * 2u64.pow(attempt - 1));
                warn!(%turn_id, attempt, ?backoff, "Retrying model call");
                tokio::time::sleep(backoff).await;
            }
            match self.llm.complete(request.clone()).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    debug!(%turn_id, attempt, error = %e, "call_model: transient failure");
                    last_error = Some(e);
                }
                Err(e) => return Err(eyre::Report::new(e).wrap_err("model call failed")),
            }
        }
        match last_error {
            Some(e) => Err(eyre::Report::new(e).wrap_err("model call failed")),
            None => Err(eyre::eyre!("model call failed with no recorded error")),
        }
    }

    /// Policy-check and (when allowed) execute one requested invocation
    async fn process_call(
        &self,
        call: &RequestedToolCall,
        ctx: &ToolContext,
        approval: Option<&ApprovalToken>,
        sequence: u32,
        emitter: Option<&EventEmitter>,
    ) -> (ToolCallRecord, ContentBlock) {
        let name = &call.name;
        debug!(%name, sequence, "process_call: called");

        // Resolve first so the policy can see the classification; a name the
        // registry doesn't know never reaches the policy or a handler
        let tool = match self.registry.get(name) {
            Ok(tool) => tool,
            Err(e) => {
                let message = e.to_string();
                let record = ToolCallRecord::failed(name, call.input.clone(), ErrorKind::UnknownTool, &message, sequence);
                let block = ContentBlock::tool_result(&call.id, &message, true);
                return (record, block);
            }
        };

        let decision = self.policy.evaluate(tool.as_ref(), &call.input, approval);
        match decision.verdict {
            Verdict::Allow => {
                if let Some(e) = emitter {
                    e.tool_call_started(name, &summarize(&call.input.to_string()));
                }
                match self.execute_with_retries(name, &call.input, ctx).await {
                    Ok(content) => {
                        let summary = summarize(&content);
                        if let Some(e) = emitter {
                            e.tool_call_completed(name, true, &summary);
                            e.action_taken(name, &summary);
                        }
                        let record = ToolCallRecord::succeeded(name, call.input.clone(), content.clone(), sequence);
                        (record, ContentBlock::tool_result(&call.id, &content, false))
                    }
                    Err(err) => {
                        let message = err.to_string();
                        if let Some(e) = emitter {
                            e.tool_call_completed(name, false, &summarize(&message));
                            e.action_taken(name, &format!("failed: {}", summarize(&message)));
                        }
                        let record =
                            ToolCallRecord::failed(name, call.input.clone(), err.kind(), &message, sequence);
                        (record, ContentBlock::tool_result(&call.id, &message, true))
                    }
                }
            }
            Verdict::RequiresApproval => {
                debug!(%name, "process_call: approval required, handler not invoked");
                if let Some(e) = emitter {
                    e.approval_required(name, &decision.reason);
                }
                let record = ToolCallRecord::failed(
                    name,
                    call.input.clone(),
                    ErrorKind::ApprovalRequired,
                    &decision.reason,
                    sequence,
                );
                (record, ContentBlock::tool_result(&call.id, &decision.reason, true))
            }
            Verdict::Deny => {
                debug!(%name, reason = %decision.reason, "process_call: denied, handler not invoked");
                let record = ToolCallRecord::failed(
                    name,
                    call.input.clone(),
                    ErrorKind::PolicyDenied,
                    &decision.reason,
                    sequence,
                );
                (record, ContentBlock::tool_result(&call.id, &decision.reason, true))
            }
        }
    }

    /// Execute a tool call, retrying transient collaborator failures
    async fn execute_with_retries(
        &self,
        name: &str,
        arguments: &serde_json::Value,
        ctx: &ToolContext,
    ) -> Result<String, ToolError> {
        let mut attempt = 0;
        loop {
            match self.executor.execute(name, arguments, ctx).await {
                Ok(content) => return Ok(content),
                Err(e) if e.is_transient() && attempt < self.config.max_retries => {
                    attempt += 1;
                    warn!(%name, attempt, error = %e, "Retrying tool call after transient failure");
                    tokio::time::sleep(Duration::from_millis(100 * attempt as u64)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

fn is_cancelled(cancel: Option<&watch::Receiver<bool>>) -> bool {
    cancel.map(|rx| *rx.borrow()).unwrap_or(false)
}

fn build_assistant_message(response: &CompletionResponse) -> Message {
    let mut blocks = Vec::new();
    if let Some(text) = &response.content {
        blocks.push(ContentBlock::text(text));
    }
    for call in &response.tool_calls {
        blocks.push(ContentBlock::ToolUse {
            id: call.id.clone(),
            name: call.name.clone(),
            input: call.input.clone(),
        });
    }
    Message::assistant_blocks(blocks)
}

fn summarize(text: &str) -> String {
    if text.len() <= RESULT_SUMMARY_MAX {
        text.to_string()
    } else {
        let cut = text
            .char_indices()
            .take_while(|(i, _)| *i < RESULT_SUMMARY_MAX)
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        format!("{}...", &text[..cut])
    }
}

fn default_system_prompt() -> &'static str {
    "You are a household inventory assistant. Answer questions about stock \
     levels, forecasts, and orders using the available tools. Read-only tools \
     run immediately; actions that change state or spend money may come back \
     as requiring the household's approval - when that happens, tell the user \
     plainly what still needs their sign-off instead of retrying."
}

/// Pick the user-facing text for the finished turn
///
/// Paraphrases limits and denials in plain language; structured error kinds
/// stay confined to the trace.
fn finalize_text(status: TurnStatus, final_text: Option<String>, trace: &[ToolCallRecord]) -> String {
    match status {
        TurnStatus::Completed => final_text.unwrap_or_else(|| "Done.".to_string()),
        TurnStatus::Denied => final_text.unwrap_or_else(|| {
            let pending = trace
                .iter()
                .filter(|r| r.is_policy_gated())
                .map(|r| r.tool_name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "I couldn't carry out every requested action: {} still needs your approval or isn't permitted.",
                pending
            )
        }),
        TurnStatus::MaxIterationsReached => {
            "I hit the limit on reasoning steps for a single request before reaching a final answer. \
             You can ask again, or narrow the question."
                .to_string()
        }
        TurnStatus::Cancelled => "This request was stopped before it finished.".to_string(),
    }
}
