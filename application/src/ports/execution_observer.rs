//! Execution observer port
//!
//! Defines the interface for reporting progress while agents run.

use council_domain::{ExecutionConfig, ExecutionResult};
use std::time::Duration;

/// Callback for progress updates during agent execution
///
/// Implementations live in the presentation layer. Every method has a no-op
/// default; callbacks are invoked inline on the stream and must not block.
pub trait ExecutionObserver: Send + Sync {
    /// Called before the first backend attempt for an agent
    fn on_agent_start(&self, _agent_id: &str, _config: &ExecutionConfig) {}

    /// Called for each narrative text block
    fn on_text(&self, _agent_id: &str, _text: &str) {}

    /// Called when the agent invokes a tool
    fn on_tool_use(&self, _agent_id: &str, _tool_name: &str) {}

    /// Called when a tool returns
    fn on_tool_result(&self, _agent_id: &str, _tool_use_id: &str, _is_error: bool) {}

    /// Called before a retry attempt, after the backoff delay was chosen
    fn on_retry(&self, _agent_id: &str, _attempt: u32, _delay: Duration) {}

    /// Called once with the final result for an agent
    fn on_agent_complete(&self, _agent_id: &str, _result: &ExecutionResult) {}

    /// Called when a fan-out batch starts
    fn on_batch_start(&self, _agent_ids: &[String]) {}

    /// Called when a fan-out batch completes
    fn on_batch_complete(&self, _total_cost_usd: f64) {}
}

/// No-op observer for when progress reporting is not needed
pub struct NoObserver;

impl ExecutionObserver for NoObserver {}
