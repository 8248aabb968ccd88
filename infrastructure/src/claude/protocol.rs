//! `stream-json` line protocol of the Claude CLI.
//!
//! Each stdout line is one JSON message. Only three kinds matter here:
//! `assistant` (text and tool_use blocks), `user` (tool_result blocks) and
//! the final `result` summary. Everything else (`system` init lines,
//! thinking blocks, unknown types) is ignored.

use super::error::{ClaudeCliError, Result};
use council_domain::{BackendEvent, RunSummary, StopReason, TokenUsage};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum StreamMessage {
    Assistant { message: MessageBody },
    User { message: MessageBody },
    Result(ResultMessage),
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        #[serde(default)]
        input: Value,
    },
    ToolResult {
        tool_use_id: String,
        #[serde(default)]
        content: Value,
        #[serde(default)]
        is_error: bool,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct ResultMessage {
    #[serde(default)]
    subtype: String,
    #[serde(default)]
    is_error: bool,
    #[serde(default)]
    total_cost_usd: Option<f64>,
    #[serde(default)]
    num_turns: Option<u32>,
    #[serde(default)]
    session_id: Option<String>,
    #[serde(default)]
    usage: Option<UsageBody>,
    #[serde(default)]
    result: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct UsageBody {
    #[serde(default)]
    input_tokens: Option<u64>,
    #[serde(default)]
    output_tokens: Option<u64>,
    #[serde(default)]
    total_tokens: Option<u64>,
}

/// Parse one stdout line into zero or more backend events.
///
/// Blank lines yield no events; lines that are not JSON are an error.
pub fn parse_line(line: &str) -> Result<Vec<BackendEvent>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Vec::new());
    }

    let message: StreamMessage =
        serde_json::from_str(line).map_err(|e| ClaudeCliError::ParseError {
            error: e.to_string(),
            raw: line.to_string(),
        })?;

    Ok(match message {
        StreamMessage::Assistant { message } | StreamMessage::User { message } => message
            .content
            .into_iter()
            .filter_map(block_to_event)
            .collect(),
        StreamMessage::Result(result) => vec![BackendEvent::Completed(summarize(result))],
        StreamMessage::Other => Vec::new(),
    })
}

fn block_to_event(block: ContentBlock) -> Option<BackendEvent> {
    match block {
        ContentBlock::Text { text } if !text.is_empty() => Some(BackendEvent::Text(text)),
        ContentBlock::ToolUse { id, name, input } => Some(BackendEvent::ToolUse { id, name, input }),
        ContentBlock::ToolResult {
            tool_use_id,
            content,
            is_error,
        } => Some(BackendEvent::ToolResult {
            tool_use_id,
            is_error,
            content: flatten_content(&content),
        }),
        _ => None,
    }
}

/// Tool result content is either a string or a list of text blocks.
fn flatten_content(content: &Value) -> String {
    match content {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| item.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn summarize(result: ResultMessage) -> RunSummary {
    let usage = result.usage.unwrap_or_default();
    RunSummary {
        session_id: result.session_id.unwrap_or_default(),
        cost_usd: result.total_cost_usd.unwrap_or(0.0),
        num_turns: result.num_turns.unwrap_or(0),
        usage: TokenUsage::new(
            usage.input_tokens.unwrap_or(0),
            usage.output_tokens.unwrap_or(0),
            usage.total_tokens,
        ),
        stop_reason: stop_reason(&result.subtype, result.is_error, result.result),
    }
}

fn stop_reason(subtype: &str, is_error: bool, detail: Option<String>) -> StopReason {
    match subtype {
        "success" if !is_error => StopReason::EndTurn,
        "error_max_turns" => StopReason::MaxTurns,
        s if s.contains("budget") => StopReason::BudgetExhausted,
        s => StopReason::ExecutionError(detail.filter(|d| !d.is_empty()).unwrap_or_else(|| {
            if s.is_empty() {
                "unknown error".to_string()
            } else {
                s.to_string()
            }
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assistant_line() {
        let line = r#"{"type":"assistant","message":{"role":"assistant","content":[{"type":"thinking","thinking":"hmm"},{"type":"text","text":"Reading the file."},{"type":"tool_use","id":"toolu_1","name":"Read","input":{"file_path":"a.md"}}]},"session_id":"s1"}"#;
        let events = parse_line(line).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], BackendEvent::Text("Reading the file.".into()));
        match &events[1] {
            BackendEvent::ToolUse { id, name, input } => {
                assert_eq!(id, "toolu_1");
                assert_eq!(name, "Read");
                assert_eq!(input["file_path"], "a.md");
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_tool_result_line() {
        let line = r#"{"type":"user","message":{"role":"user","content":[{"type":"tool_result","tool_use_id":"toolu_1","content":[{"type":"text","text":"line one"},{"type":"text","text":"line two"}],"is_error":true}]}}"#;
        let events = parse_line(line).unwrap();
        assert_eq!(
            events,
            vec![BackendEvent::ToolResult {
                tool_use_id: "toolu_1".into(),
                is_error: true,
                content: "line one\nline two".into(),
            }]
        );
    }

    #[test]
    fn test_result_line() {
        let line = r#"{"type":"result","subtype":"success","is_error":false,"total_cost_usd":0.0421,"num_turns":3,"session_id":"abc","result":"done","usage":{"input_tokens":1200,"output_tokens":300}}"#;
        let events = parse_line(line).unwrap();
        let BackendEvent::Completed(summary) = &events[0] else {
            panic!("expected summary");
        };
        assert_eq!(summary.session_id, "abc");
        assert_eq!(summary.cost_usd, 0.0421);
        assert_eq!(summary.num_turns, 3);
        assert_eq!(summary.usage, TokenUsage::new(1200, 300, Some(1500)));
        assert_eq!(summary.stop_reason, StopReason::EndTurn);
    }

    #[test]
    fn test_result_subtypes() {
        assert_eq!(stop_reason("error_max_turns", true, None), StopReason::MaxTurns);
        assert_eq!(
            stop_reason("error_max_budget_usd", true, None),
            StopReason::BudgetExhausted
        );
        assert_eq!(
            stop_reason("error_during_execution", true, Some("boom".into())),
            StopReason::ExecutionError("boom".into())
        );
        assert_eq!(
            stop_reason("success", true, None),
            StopReason::ExecutionError("success".into())
        );
    }

    #[test]
    fn test_ignored_and_invalid_lines() {
        assert!(parse_line("").unwrap().is_empty());
        assert!(
            parse_line(r#"{"type":"system","subtype":"init","tools":[]}"#)
                .unwrap()
                .is_empty()
        );
        assert!(matches!(
            parse_line("not json"),
            Err(ClaudeCliError::ParseError { .. })
        ));
    }
}
