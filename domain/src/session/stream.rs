//! Streaming events for one backend run.
//!
//! A run produces, in order, any number of [`BackendEvent::Text`],
//! [`BackendEvent::ToolUse`] and [`BackendEvent::ToolResult`] events, and
//! ends with a single [`BackendEvent::Completed`] carrying the
//! [`RunSummary`].

use crate::execution::result::TokenUsage;

/// Why the backend stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The agent finished on its own.
    EndTurn,
    /// `max_turns` reached.
    MaxTurns,
    /// `max_budget_usd` reached.
    BudgetExhausted,
    /// Wall-clock timeout reached.
    Timeout,
    /// The backend reported an execution error in its summary.
    ExecutionError(String),
}

/// Terminal report of a backend run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub session_id: String,
    pub cost_usd: f64,
    pub num_turns: u32,
    pub usage: TokenUsage,
    pub stop_reason: StopReason,
}

/// An event in a streaming backend run.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendEvent {
    /// Narrative text from the agent.
    Text(String),
    /// The agent invoked a tool.
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    /// A tool returned.
    ToolResult {
        tool_use_id: String,
        is_error: bool,
        content: String,
    },
    /// The run is over (signals stream end).
    Completed(RunSummary),
}

impl BackendEvent {
    /// Returns the text content if this is a Text event.
    pub fn text(&self) -> Option<&str> {
        match self {
            BackendEvent::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns true if this event signals the end of the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BackendEvent::Completed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_event_returns_content() {
        let event = BackendEvent::Text("hello".to_string());
        assert_eq!(event.text(), Some("hello"));
        assert!(!event.is_terminal());
    }

    #[test]
    fn tool_events_are_not_terminal() {
        let event = BackendEvent::ToolUse {
            id: "toolu_1".to_string(),
            name: "WebSearch".to_string(),
            input: serde_json::json!({"query": "rust"}),
        };
        assert!(!event.is_terminal());
        assert_eq!(event.text(), None);
    }

    #[test]
    fn completed_is_terminal() {
        let event = BackendEvent::Completed(RunSummary {
            session_id: String::new(),
            cost_usd: 0.0,
            num_turns: 1,
            usage: TokenUsage::default(),
            stop_reason: StopReason::EndTurn,
        });
        assert!(event.is_terminal());
    }
}
