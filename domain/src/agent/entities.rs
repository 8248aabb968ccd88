//! Agent definition entity.

use super::normalize_agent_id;
use crate::execution::config::ExecutionOverrides;
use crate::resource::parser::ResourceHeader;
use serde::Serialize;
use std::fmt;

/// Header keys accepted for the agent id, in priority order.
const ID_KEYS: &[&str] = &["id", "agent"];

/// Header keys accepted for trigger hints, in priority order.
const TRIGGER_KEYS: &[&str] = &["trigger_conditions", "triggers"];

/// Where a definition came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Ships with the system
    Builtin,
    /// Lives in an external contributor's namespace
    Contributed,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::Builtin => "builtin",
            Provenance::Contributed => "contributed",
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a parsed header did not produce a definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No `id` (or `agent`) key
    MissingId,
    /// `enabled: false`
    Disabled,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingId => f.write_str("header has no 'id' key"),
            SkipReason::Disabled => f.write_str("agent is disabled"),
        }
    }
}

/// A named, independently configured behavioral profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentDefinition {
    /// Unique, lowercase id
    pub id: String,
    /// Short description shown in the summary table
    pub description: String,
    /// Full body text, passed to the backend as the agent's instructions
    pub instructions: String,
    /// Free-text conditions under which the agent should run (may be empty)
    pub trigger_hints: Vec<String>,
    pub provenance: Provenance,
    /// Namespace name registered as a second key for this definition
    pub alias_of: Option<String>,
    /// Limits declared by the resource itself
    #[serde(skip)]
    pub overrides: ExecutionOverrides,
}

impl AgentDefinition {
    pub fn new(
        id: impl AsRef<str>,
        description: impl Into<String>,
        instructions: impl Into<String>,
        provenance: Provenance,
    ) -> Self {
        Self {
            id: normalize_agent_id(id.as_ref()),
            description: description.into(),
            instructions: instructions.into(),
            trigger_hints: Vec::new(),
            provenance,
            alias_of: None,
            overrides: ExecutionOverrides::default(),
        }
    }

    /// Build a definition from a parsed resource header and body.
    pub fn from_header(
        header: &ResourceHeader,
        body: &str,
        provenance: Provenance,
    ) -> Result<Self, SkipReason> {
        let id = ID_KEYS
            .iter()
            .find_map(|key| header.scalar(key))
            .map(normalize_agent_id)
            .filter(|id| !id.is_empty())
            .ok_or(SkipReason::MissingId)?;

        if header
            .scalar("enabled")
            .is_some_and(|v| matches!(v.trim().to_lowercase().as_str(), "false" | "no" | "0"))
        {
            return Err(SkipReason::Disabled);
        }

        let trigger_hints = TRIGGER_KEYS
            .iter()
            .find_map(|key| header.list(key))
            .map(|items| {
                items
                    .iter()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let overrides = ExecutionOverrides::from_raw(
            header.scalar("max_turns"),
            header.scalar("max_budget_usd"),
            header.scalar("timeout_seconds"),
        );

        Ok(Self {
            id,
            description: header.scalar("description").unwrap_or_default().to_string(),
            instructions: body.trim().to_string(),
            trigger_hints,
            provenance,
            alias_of: None,
            overrides,
        })
    }

    pub fn with_trigger_hints(mut self, hints: Vec<String>) -> Self {
        self.trigger_hints = hints;
        self
    }

    pub fn with_overrides(mut self, overrides: ExecutionOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Record the container (namespace) name when it differs from the id.
    pub fn with_container(mut self, container: &str) -> Self {
        let container = normalize_agent_id(container);
        if !container.is_empty() && container != self.id {
            self.alias_of = Some(container);
        }
        self
    }
}
