//! Decision parsing for overseer output.
//!
//! Overseer agents are asked for YAML but reply in several shapes. Each
//! shape is handled by a named strategy; strategies never fail, they only
//! return `None`, and are tried in a fixed order until one yields a mapping.
//!
//! | Strategy | Shape |
//! |----------|-------|
//! | `fenced_block` | prose around a ```` ```yaml ```` fence |
//! | `bare_document` | text starting with `---` |
//! | `flat_key_value` | every meaningful line is `key: value` |

use super::entities::{RankedItem, TriggerDecision};
use crate::agent::normalize_agent_id;
use serde_yaml::{Mapping, Value};

type Strategy = fn(&str) -> Option<Mapping>;

const STRATEGIES: &[(&str, Strategy)] = &[
    ("fenced_block", fenced_block),
    ("bare_document", bare_document),
    ("flat_key_value", flat_key_value),
];

const AGENT_KEYS: &[&str] = &["agent", "trigger_agent"];
const ACTION_KEYS: &[&str] = &["comment", "trigger_comment"];
const RATIONALE_KEYS: &[&str] = &["reason", "skip_reason"];

/// Default follow-up actions for well-known agents.
const DEFAULT_ACTIONS: &[(&str, &str)] = &[
    ("moderator", "@moderator please triage"),
    ("reviewer_a", "@reviewer_a please review"),
    ("reviewer_b", "@reviewer_b please look for problems"),
    ("summarizer", "@summarizer please summarize"),
    ("observer", "@observer"),
];

/// Parse an overseer response into a [`TriggerDecision`].
///
/// Never fails: unparseable text yields an inert decision, and a trigger
/// without a target agent is downgraded to "do not trigger".
///
/// # Examples
///
/// ```
/// use council_domain::decision::parse_decision;
///
/// let decision = parse_decision("should_trigger: true\nagent: moderator\n");
/// assert!(decision.should_trigger);
/// assert_eq!(decision.target_agent_id, "moderator");
///
/// assert!(!parse_decision("should_trigger: true\n").should_trigger);
/// assert!(!parse_decision("I am not sure.").should_trigger);
/// ```
pub fn parse_decision(raw: &str) -> TriggerDecision {
    let Some(map) = extract_mapping(raw) else {
        return TriggerDecision::inert();
    };

    let target = first_text(&map, AGENT_KEYS)
        .map(|agent| normalize_agent_id(&agent))
        .unwrap_or_default();
    let should_trigger = map.get("should_trigger").is_some_and(truthy) && !target.is_empty();

    let rationale = first_text(&map, RATIONALE_KEYS).unwrap_or_default();
    let analysis = text_of(map.get("analysis")).unwrap_or_default();

    if !should_trigger {
        return TriggerDecision {
            rationale,
            analysis,
            ..TriggerDecision::inert()
        };
    }

    let suggested_action =
        first_text(&map, ACTION_KEYS).unwrap_or_else(|| default_action(&target));

    TriggerDecision {
        should_trigger,
        target_agent_id: target,
        rationale,
        suggested_action,
        analysis,
    }
}

/// Parse a ranking response over `candidate_count` numbered candidates.
///
/// Expects a `recommended` list of `{index, title, reason, summary}` records.
/// Records whose index is missing or outside `[0, candidate_count)` are
/// dropped; the rest are kept in response order.
pub fn parse_ranking(raw: &str, candidate_count: usize) -> Vec<RankedItem> {
    let Some(map) = extract_mapping(raw) else {
        return Vec::new();
    };
    let Some(entries) = map.get("recommended").and_then(Value::as_sequence) else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(Value::as_mapping)
        .filter_map(|entry| {
            let index = entry.get("index").and_then(index_of)?;
            if index >= candidate_count {
                return None;
            }
            Some(RankedItem {
                index,
                title: text_of(entry.get("title")).unwrap_or_default(),
                rationale: first_text(entry, &["reason", "rationale"]).unwrap_or_default(),
                summary: text_of(entry.get("summary")).unwrap_or_default(),
            })
        })
        .collect()
}

/// Follow-up action used when the overseer names an agent but gives no text.
pub fn default_action(agent_id: &str) -> String {
    DEFAULT_ACTIONS
        .iter()
        .find(|(id, _)| *id == agent_id)
        .map(|(_, action)| (*action).to_string())
        .unwrap_or_else(|| format!("@{}", agent_id))
}

fn extract_mapping(raw: &str) -> Option<Mapping> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }
    STRATEGIES.iter().find_map(|(_, strategy)| strategy(text))
}

fn fenced_block(text: &str) -> Option<Mapping> {
    let start = ["```yaml", "```yml"]
        .iter()
        .find_map(|fence| text.find(fence))?;
    let after_open = &text[start..];
    let interior_start = after_open.find('\n')? + 1;
    let interior = &after_open[interior_start..];
    let interior = match interior.find("```") {
        Some(end) => &interior[..end],
        None => interior,
    };
    load_mapping(interior)
}

fn bare_document(text: &str) -> Option<Mapping> {
    let rest = text.strip_prefix("---")?;
    let rest = rest.strip_prefix('\n').or_else(|| rest.strip_prefix("\r\n"))?;
    // A closing delimiter ends the document; anything after it is prose.
    let document = match rest.lines().position(|line| line.trim() == "---") {
        Some(end) => rest.lines().take(end).collect::<Vec<_>>().join("\n"),
        None => rest.to_string(),
    };
    load_mapping(&document)
}

fn flat_key_value(text: &str) -> Option<Mapping> {
    let mut meaningful = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .peekable();
    meaningful.peek()?;
    if !meaningful.all(|line| line.contains(':')) {
        return None;
    }

    load_mapping(text).or_else(|| split_lines(text))
}

/// Last-resort `key: value` split for text YAML rejects (e.g. unquoted
/// colons inside values).
fn split_lines(text: &str) -> Option<Mapping> {
    let mut map = Mapping::new();
    for line in text.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (key, value) = line.split_once(':')?;
        let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
        map.insert(
            Value::String(key.trim().to_string()),
            Value::String(value.to_string()),
        );
    }
    (!map.is_empty()).then_some(map)
}

fn load_mapping(text: &str) -> Option<Mapping> {
    match serde_yaml::from_str::<Value>(text) {
        Ok(Value::Mapping(map)) => Some(map),
        _ => None,
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_i64() == Some(1),
        Value::String(s) => matches!(s.trim().to_lowercase().as_str(), "true" | "yes" | "1"),
        _ => false,
    }
}

fn index_of(value: &Value) -> Option<usize> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| usize::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn text_of(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn first_text(map: &Mapping, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| text_of(map.get(*key)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_lines() {
        let decision = parse_decision("should_trigger: true\nagent: moderator\n");
        assert!(decision.should_trigger);
        assert_eq!(decision.target_agent_id, "moderator");
        assert_eq!(decision.suggested_action, "@moderator please triage");
    }

    #[test]
    fn test_trigger_without_agent_is_inert() {
        let decision = parse_decision("should_trigger: true\n");
        assert!(!decision.should_trigger);
        assert!(decision.target_agent_id.is_empty());
        assert!(decision.suggested_action.is_empty());
    }

    #[test]
    fn test_fenced_block_with_prose() {
        let raw = r#"After reading the thread I think a review is due.

```yaml
should_trigger: true
trigger_agent: Reviewer_B
trigger_comment: "@reviewer_b check the proof in section 3"
reason: the proof skips a step
analysis: |
  Two participants disagree about lemma 2.
```

Let me know if anything else is needed."#;

        let decision = parse_decision(raw);
        assert!(decision.should_trigger);
        assert_eq!(decision.target_agent_id, "reviewer_b");
        assert_eq!(
            decision.suggested_action,
            "@reviewer_b check the proof in section 3"
        );
        assert_eq!(decision.rationale, "the proof skips a step");
        assert!(decision.analysis.contains("lemma 2"));
    }

    #[test]
    fn test_bare_document() {
        let raw = "---\nshould_trigger: false\nskip_reason: already answered\n---\ntrailing prose";
        let decision = parse_decision(raw);
        assert!(!decision.should_trigger);
        assert_eq!(decision.rationale, "already answered");
    }

    #[test]
    fn test_flat_lines_with_colons_in_values() {
        let raw = "should_trigger: yes\nagent: summarizer\nreason: time to wrap up: 40 comments";
        let decision = parse_decision(raw);
        assert!(decision.should_trigger);
        assert_eq!(decision.target_agent_id, "summarizer");
        assert_eq!(decision.rationale, "time to wrap up: 40 comments");
    }

    #[test]
    fn test_unstructured_text_is_inert() {
        for raw in ["", "   ", "I would rather not decide.", "```yaml\n- just\n- a list\n```"] {
            assert_eq!(parse_decision(raw), TriggerDecision::inert(), "input: {raw:?}");
        }
    }

    #[test]
    fn test_non_trigger_clears_target() {
        let decision = parse_decision("should_trigger: false\nagent: moderator\nreason: quiet thread");
        assert!(!decision.should_trigger);
        assert!(decision.target_agent_id.is_empty());
        assert_eq!(decision.rationale, "quiet thread");
    }

    #[test]
    fn test_default_action() {
        assert_eq!(default_action("reviewer_a"), "@reviewer_a please review");
        assert_eq!(default_action("gqy22"), "@gqy22");
    }

    #[test]
    fn test_parse_ranking_drops_out_of_range() {
        let raw = r#"```yaml
recommended:
  - index: 0
    title: First
    reason: strong results
    summary: a summary
  - index: 5
    title: Ghost
  - index: 2
    reason: surprising
  - index: -1
  - title: no index
```"#;

        let items = parse_ranking(raw, 3);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].index, 0);
        assert_eq!(items[0].title, "First");
        assert_eq!(items[0].rationale, "strong results");
        assert_eq!(items[1].index, 2);
        assert_eq!(items[1].rationale, "surprising");
    }

    #[test]
    fn test_parse_ranking_without_list() {
        assert!(parse_ranking("recommended: none", 3).is_empty());
        assert!(parse_ranking("no yaml here", 3).is_empty());
    }
}
