//! Run Agent use case
//!
//! Executes one agent against the backend under turn/budget/timeout limits:
//! 1. Resolve the agent in the registry (unknown ids become failure results)
//! 2. Derive the effective config from the agent's own overrides
//! 3. Invoke the backend under the retry policy, observing the event stream
//! 4. Normalize the stream into an [`ExecutionResult`]

use crate::ports::agent_backend::{AgentBackend, BackendError, BackendRequest};
use crate::ports::execution_observer::{ExecutionObserver, NoObserver};
use crate::retry::{RetryPolicy, retry_async};
use council_domain::{
    AgentRegistry, BackendEvent, ExecutionConfig, ExecutionOutcome, ExecutionResult, FailureKind,
    truncate,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

const TEXT_PREVIEW_LEN: usize = 100;
const TOOL_RESULT_PREVIEW_LEN: usize = 500;

/// Input for the RunAgent use case
#[derive(Debug, Clone)]
pub struct RunAgentInput {
    pub prompt: String,
    pub agent_id: String,
    pub config: ExecutionConfig,
    /// Replaces the registry instructions for this run (e.g. instructions
    /// with placeholders already filled in)
    pub instructions: Option<String>,
}

impl RunAgentInput {
    pub fn new(prompt: impl Into<String>, agent_id: impl Into<String>, config: ExecutionConfig) -> Self {
        Self {
            prompt: prompt.into(),
            agent_id: agent_id.into(),
            config,
            instructions: None,
        }
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }
}

/// Use case for running a single agent
pub struct RunAgentUseCase<B: AgentBackend + ?Sized + 'static> {
    backend: Arc<B>,
    registry: Arc<AgentRegistry>,
    retry: RetryPolicy,
}

impl<B: AgentBackend + ?Sized + 'static> RunAgentUseCase<B> {
    pub fn new(backend: Arc<B>, registry: Arc<AgentRegistry>) -> Self {
        Self {
            backend,
            registry,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn registry(&self) -> &Arc<AgentRegistry> {
        &self.registry
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(&self, input: RunAgentInput) -> ExecutionResult {
        self.execute_with_observer(input, &NoObserver).await
    }

    /// Execute the use case with progress callbacks.
    ///
    /// Never fails: lookup misses and backend errors come back as
    /// failure-shaped results.
    pub async fn execute_with_observer(
        &self,
        input: RunAgentInput,
        observer: &dyn ExecutionObserver,
    ) -> ExecutionResult {
        let Some(definition) = self.registry.get(&input.agent_id).cloned() else {
            warn!(agent = %input.agent_id, "Agent not found in registry");
            let result = ExecutionResult::failure(
                &input.agent_id,
                FailureKind::UnknownAgent,
                "agent not found in registry",
            );
            observer.on_agent_complete(&input.agent_id, &result);
            return result;
        };

        let agent_id = definition.id.clone();
        let config = input.config.with_overrides(&definition.overrides);
        let request = BackendRequest {
            agent_id: agent_id.clone(),
            prompt: input.prompt,
            instructions: input
                .instructions
                .unwrap_or_else(|| definition.instructions.clone()),
            config,
        };

        info!(
            agent = %agent_id,
            max_turns = config.max_turns(),
            max_budget_usd = config.max_budget_usd(),
            timeout_seconds = config.timeout_seconds(),
            "Starting agent"
        );
        observer.on_agent_start(&agent_id, &config);

        let outcome = retry_async(&self.retry, |attempt| {
            if attempt > 1 {
                observer.on_retry(&agent_id, attempt, self.retry.delay_for(attempt - 1));
            }
            self.attempt(&request, observer)
        })
        .await;

        let result = match outcome {
            Ok(result) => result,
            Err(e) => {
                warn!(agent = %agent_id, "Agent failed: {}", e);
                ExecutionResult::failure(&agent_id, FailureKind::Backend, &e)
            }
        };

        info!(
            agent = %agent_id,
            outcome = result.outcome().as_str(),
            "Agent finished - cost: ${:.4}, turns: {}, tools: {}",
            result.cost_usd(),
            result.turns_used(),
            result.tool_calls().len()
        );
        observer.on_agent_complete(&agent_id, &result);
        result
    }

    /// One backend attempt, consumed to the end of its stream.
    ///
    /// Terminal exhaustion reported mid-stream ends the attempt with the
    /// partial content as a normal result, so it is never retried.
    async fn attempt(
        &self,
        request: &BackendRequest,
        observer: &dyn ExecutionObserver,
    ) -> Result<ExecutionResult, BackendError> {
        let agent_id = request.agent_id.as_str();
        let mut text_blocks: Vec<String> = Vec::new();
        let mut tool_calls: Vec<String> = Vec::new();

        let mut stream = match self.backend.invoke(request).await {
            Ok(stream) => stream,
            Err(e) => {
                return match exhaustion_outcome(&e) {
                    Some(outcome) => Ok(ExecutionResult::interrupted("", Vec::new(), outcome)),
                    None => Err(e),
                };
            }
        };

        while let Some(item) = stream.recv().await {
            let event = match item {
                Ok(event) => event,
                Err(e) => {
                    if let Some(outcome) = exhaustion_outcome(&e) {
                        info!(agent = %agent_id, "Run stopped early: {}", e);
                        return Ok(ExecutionResult::interrupted(
                            text_blocks.join("\n"),
                            tool_calls,
                            outcome,
                        ));
                    }
                    return Err(e);
                }
            };

            match event {
                BackendEvent::Text(text) => {
                    info!(agent = %agent_id, "[Text] {}", truncate(&text, TEXT_PREVIEW_LEN));
                    observer.on_text(agent_id, &text);
                    text_blocks.push(text);
                }
                BackendEvent::ToolUse { id, name, input } => {
                    info!(agent = %agent_id, "[Tool] {}(id={})", name, id);
                    debug!(agent = %agent_id, "[ToolInput] {}", input);
                    observer.on_tool_use(agent_id, &name);
                    tool_calls.push(name);
                }
                BackendEvent::ToolResult {
                    tool_use_id,
                    is_error,
                    content,
                } => {
                    info!(agent = %agent_id, "[ToolResult] id={} error={}", tool_use_id, is_error);
                    if !content.is_empty() {
                        debug!(
                            agent = %agent_id,
                            "[ToolResult] id={}: {}",
                            tool_use_id,
                            truncate(&content, TOOL_RESULT_PREVIEW_LEN)
                        );
                    }
                    observer.on_tool_result(agent_id, &tool_use_id, is_error);
                }
                BackendEvent::Completed(summary) => {
                    info!(agent = %agent_id, session_id = %summary.session_id, "[Result] stop={:?}", summary.stop_reason);
                    return Ok(ExecutionResult::from_summary(
                        text_blocks.join("\n"),
                        tool_calls,
                        &summary,
                    ));
                }
            }
        }

        Err(BackendError::StreamInterrupted(
            "stream ended without a result summary".to_string(),
        ))
    }
}

fn exhaustion_outcome(error: &BackendError) -> Option<ExecutionOutcome> {
    match error {
        BackendError::Timeout(_) => Some(ExecutionOutcome::TimedOut),
        BackendError::BudgetExhausted => Some(ExecutionOutcome::BudgetExhausted),
        _ => None,
    }
}
