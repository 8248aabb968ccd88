//! Normalized outcome of one agent execution.

use crate::session::stream::{RunSummary, StopReason};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Token counts reported by the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
}

impl TokenUsage {
    /// Build usage, deriving the total when the backend omits it.
    pub fn new(input_tokens: u64, output_tokens: u64, total_tokens: Option<u64>) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens: total_tokens.unwrap_or(input_tokens + output_tokens),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.input_tokens == 0 && self.output_tokens == 0 && self.total_tokens == 0
    }
}

/// Why a run was converted into a failure-shaped result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The agent id is not in the registry
    UnknownAgent,
    /// The backend failed (after retries, or with a non-retryable error)
    Backend,
    /// The per-agent unit of work panicked
    Panic,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::UnknownAgent => "unknown_agent",
            FailureKind::Backend => "backend",
            FailureKind::Panic => "panic",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a run ended.
///
/// Resource exhaustion (turns, budget, timeout) is an expected, terminal
/// outcome, not a failure: the result still carries whatever content the
/// backend produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "kind", rename_all = "snake_case")]
pub enum ExecutionOutcome {
    Completed,
    TurnLimit,
    BudgetExhausted,
    TimedOut,
    Failed(FailureKind),
}

impl ExecutionOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, ExecutionOutcome::Failed(_))
    }

    /// True for the terminal resource-exhaustion outcomes.
    pub fn is_exhausted(&self) -> bool {
        matches!(
            self,
            ExecutionOutcome::TurnLimit
                | ExecutionOutcome::BudgetExhausted
                | ExecutionOutcome::TimedOut
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionOutcome::Completed => "completed",
            ExecutionOutcome::TurnLimit => "turn_limit",
            ExecutionOutcome::BudgetExhausted => "budget_exhausted",
            ExecutionOutcome::TimedOut => "timed_out",
            ExecutionOutcome::Failed(_) => "failed",
        }
    }
}

impl From<&StopReason> for ExecutionOutcome {
    fn from(reason: &StopReason) -> Self {
        match reason {
            StopReason::EndTurn => ExecutionOutcome::Completed,
            StopReason::MaxTurns => ExecutionOutcome::TurnLimit,
            StopReason::BudgetExhausted => ExecutionOutcome::BudgetExhausted,
            StopReason::Timeout => ExecutionOutcome::TimedOut,
            StopReason::ExecutionError(_) => ExecutionOutcome::Failed(FailureKind::Backend),
        }
    }
}

/// Result of one agent execution.
///
/// Built once per run and never modified afterwards; accessors only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    response_text: String,
    cost_usd: f64,
    turns_used: u32,
    tool_calls: Vec<String>,
    session_id: String,
    usage: TokenUsage,
    outcome: ExecutionOutcome,
}

impl ExecutionResult {
    /// A run that reached the backend's result summary.
    ///
    /// Cost and turn count come from the backend: it is the only party that
    /// knows them.
    pub fn from_summary(
        response_text: impl Into<String>,
        tool_calls: Vec<String>,
        summary: &RunSummary,
    ) -> Self {
        Self {
            response_text: response_text.into(),
            cost_usd: sanitize_cost(summary.cost_usd),
            turns_used: summary.num_turns,
            tool_calls,
            session_id: summary.session_id.clone(),
            usage: summary.usage,
            outcome: ExecutionOutcome::from(&summary.stop_reason),
        }
    }

    /// A run that ended on a terminal limit before any summary arrived.
    ///
    /// Keeps the partial text and tool calls; cost and turns are unknown and
    /// reported as zero.
    pub fn interrupted(
        response_text: impl Into<String>,
        tool_calls: Vec<String>,
        outcome: ExecutionOutcome,
    ) -> Self {
        Self {
            response_text: response_text.into(),
            cost_usd: 0.0,
            turns_used: 0,
            tool_calls,
            session_id: String::new(),
            usage: TokenUsage::default(),
            outcome,
        }
    }

    /// A failure represented as data.
    ///
    /// The response text is a descriptive message suitable for posting
    /// downstream; cost is zero.
    pub fn failure(agent_id: &str, kind: FailureKind, message: impl fmt::Display) -> Self {
        Self {
            response_text: format!(
                "[guardrail] Agent {} failed ({}): {}",
                agent_id, kind, message
            ),
            cost_usd: 0.0,
            turns_used: 0,
            tool_calls: Vec::new(),
            session_id: String::new(),
            usage: TokenUsage::default(),
            outcome: ExecutionOutcome::Failed(kind),
        }
    }

    pub fn response_text(&self) -> &str {
        &self.response_text
    }

    pub fn cost_usd(&self) -> f64 {
        self.cost_usd
    }

    pub fn turns_used(&self) -> u32 {
        self.turns_used
    }

    pub fn tool_calls(&self) -> &[String] {
        &self.tool_calls
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn usage(&self) -> TokenUsage {
        self.usage
    }

    pub fn outcome(&self) -> ExecutionOutcome {
        self.outcome
    }

    pub fn is_success(&self) -> bool {
        !self.outcome.is_failure()
    }
}

fn sanitize_cost(cost: f64) -> f64 {
    if cost.is_finite() && cost > 0.0 { cost } else { 0.0 }
}
