//! Decision records produced from overseer output.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The overseer's verdict on whether, and which, agent should run next.
///
/// `target_agent_id` is non-empty exactly when `should_trigger` is true.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerDecision {
    pub should_trigger: bool,
    pub target_agent_id: String,
    pub rationale: String,
    /// Follow-up instruction to hand to the collaboration surface
    pub suggested_action: String,
    /// Internal commentary, not meant for publication
    pub analysis: String,
}

impl TriggerDecision {
    /// A decision that triggers nothing.
    pub fn inert() -> Self {
        Self::default()
    }

    pub fn trigger(agent_id: impl Into<String>, suggested_action: impl Into<String>) -> Self {
        Self {
            should_trigger: true,
            target_agent_id: agent_id.into(),
            suggested_action: suggested_action.into(),
            ..Self::default()
        }
    }

    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = rationale.into();
        self
    }
}

/// A discussion thread as seen by the overseer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadSnapshot {
    pub number: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    /// Pre-rendered comment history
    #[serde(default)]
    pub comments: String,
}

impl ThreadSnapshot {
    pub fn new(number: u64, title: impl Into<String>) -> Self {
        Self {
            number,
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_comments(mut self, comments: impl Into<String>) -> Self {
        self.comments = comments.into();
        self
    }
}

/// A numbered item offered to the ranking agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub url: String,
    /// Extra labelled fields rendered verbatim (authors, category, ...)
    #[serde(default)]
    pub details: BTreeMap<String, String>,
}

impl Candidate {
    pub fn new(title: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            summary: summary.into(),
            ..Self::default()
        }
    }
}

/// One entry of a parsed ranking response; `index` is always in range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedItem {
    pub index: usize,
    pub title: String,
    pub rationale: String,
    pub summary: String,
}

/// A ranked entry joined back to the candidate it refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedCandidate {
    pub index: usize,
    pub candidate: Candidate,
    pub rationale: String,
    /// Ranker's summary, or the candidate's own when the ranker gave none
    pub summary: String,
}

impl RankedCandidate {
    pub fn join(item: RankedItem, candidate: Candidate) -> Self {
        let summary = if item.summary.trim().is_empty() {
            candidate.summary.clone()
        } else {
            item.summary
        };
        Self {
            index: item.index,
            candidate,
            rationale: item.rationale,
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inert_decision() {
        let decision = TriggerDecision::inert();
        assert!(!decision.should_trigger);
        assert!(decision.target_agent_id.is_empty());
    }

    #[test]
    fn test_join_falls_back_to_candidate_summary() {
        let item = RankedItem {
            index: 1,
            title: String::new(),
            rationale: "novel".into(),
            summary: "  ".into(),
        };
        let joined = RankedCandidate::join(item, Candidate::new("Paper", "original abstract"));
        assert_eq!(joined.summary, "original abstract");
        assert_eq!(joined.rationale, "novel");
        assert_eq!(joined.candidate.title, "Paper");
    }

    #[test]
    fn test_candidate_deserializes_with_defaults() {
        let candidate: Candidate = serde_json::from_str(r#"{"title": "Only title"}"#).unwrap();
        assert_eq!(candidate.title, "Only title");
        assert!(candidate.summary.is_empty());
        assert!(candidate.details.is_empty());
    }
}
