//! Agent registry value.
//!
//! A registry is rebuilt wholesale on every scan and is read-only afterwards,
//! so it can be shared across concurrent executions behind an `Arc`.

use super::entities::AgentDefinition;
use super::{OVERSEER_AGENT_ID, normalize_agent_id};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Placeholder shown when an agent declares no trigger hints.
pub const AUTO_DECIDE: &str = "auto-decide";

/// Mapping from agent id (and alias) to a shared definition.
#[derive(Debug, Clone, Default)]
pub struct AgentRegistry {
    entries: BTreeMap<String, Arc<AgentDefinition>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition under its id and, if set, its alias.
    ///
    /// An existing entry with the same key is replaced. Aliases that pointed
    /// at an earlier definition with the same id are repointed to the new one.
    pub fn register(&mut self, definition: AgentDefinition) {
        let definition = Arc::new(definition);
        for entry in self.entries.values_mut() {
            if entry.id == definition.id {
                *entry = Arc::clone(&definition);
            }
        }
        if let Some(alias) = &definition.alias_of {
            self.entries.insert(alias.clone(), Arc::clone(&definition));
        }
        self.entries.insert(definition.id.clone(), definition);
    }

    pub fn get(&self, id: &str) -> Option<&Arc<AgentDefinition>> {
        self.entries.get(&normalize_agent_id(id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn instructions(&self, id: &str) -> Option<&str> {
        self.get(id).map(|def| def.instructions.as_str())
    }

    /// All registered keys, aliases included, in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<AgentDefinition>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render a markdown table of agents and their trigger hints.
    ///
    /// Each definition appears once (under its declared id) and the default
    /// overseer is left out of its own summary.
    pub fn render_summary(&self) -> String {
        self.render_summary_excluding(OVERSEER_AGENT_ID)
    }

    /// Same table, leaving out the agent `excluded` instead.
    pub fn render_summary_excluding(&self, excluded: &str) -> String {
        let mut lines = vec![
            "| Agent | Description | When to trigger |".to_string(),
            "|-------|-------------|-----------------|".to_string(),
        ];

        for (key, def) in &self.entries {
            if key != &def.id || def.id == excluded {
                continue;
            }
            let triggers = if def.trigger_hints.is_empty() {
                AUTO_DECIDE.to_string()
            } else {
                def.trigger_hints.join("; ")
            };
            lines.push(format!(
                "| {} | {} | {} |",
                escape_cell(&def.id),
                escape_cell(&def.description),
                escape_cell(&triggers)
            ));
        }

        lines.join("\n")
    }
}

impl PartialEq for AgentRegistry {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .zip(other.entries.iter())
                .all(|((ka, va), (kb, vb))| ka == kb && va.as_ref() == vb.as_ref())
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::entities::Provenance;

    fn builtin(id: &str, description: &str) -> AgentDefinition {
        AgentDefinition::new(id, description, format!("You are {id}."), Provenance::Builtin)
    }

    #[test]
    fn test_alias_shares_definition() {
        let mut registry = AgentRegistry::new();
        registry.register(
            AgentDefinition::new("gqy22-reviewer", "ext", "body", Provenance::Contributed)
                .with_container("gqy22"),
        );

        let by_id = registry.get("gqy22-reviewer").unwrap();
        let by_alias = registry.get("GQY22").unwrap();
        assert!(Arc::ptr_eq(by_id, by_alias));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_later_registration_overwrites() {
        let mut registry = AgentRegistry::new();
        registry.register(builtin("moderator", "builtin"));
        registry.register(AgentDefinition::new(
            "moderator",
            "custom",
            "custom body",
            Provenance::Contributed,
        ));

        let def = registry.get("moderator").unwrap();
        assert_eq!(def.description, "custom");
        assert_eq!(def.provenance, Provenance::Contributed);
        assert_eq!(registry.instructions("moderator"), Some("custom body"));
    }

    #[test]
    fn test_redeclared_id_repoints_existing_alias() {
        let mut registry = AgentRegistry::new();
        registry.register(
            AgentDefinition::new("alice-reviewer", "alice", "a", Provenance::Contributed)
                .with_container("alice"),
        );
        registry.register(
            AgentDefinition::new("alice-reviewer", "bob", "b", Provenance::Contributed)
                .with_container("bob"),
        );

        let by_id = registry.get("alice-reviewer").unwrap();
        for alias in ["alice", "bob"] {
            let by_alias = registry.get(alias).unwrap();
            assert!(Arc::ptr_eq(by_id, by_alias), "alias '{alias}' diverged");
        }
        assert_eq!(registry.instructions("alice"), Some("b"));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_render_summary() {
        let mut registry = AgentRegistry::new();
        registry.register(builtin("observer", "watches"));
        registry.register(
            builtin("reviewer_a", "critic | strict")
                .with_trigger_hints(vec!["new proposal".into(), "design change".into()]),
        );
        registry.register(builtin("summarizer", "sums up"));
        registry.register(
            AgentDefinition::new("ext-bot", "external", "", Provenance::Contributed)
                .with_container("ext"),
        );

        let table = registry.render_summary();
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines[0], "| Agent | Description | When to trigger |");
        assert!(!table.contains("observer"));
        assert!(table.contains("| reviewer_a | critic \\| strict | new proposal; design change |"));
        assert!(table.contains("| summarizer | sums up | auto-decide |"));
        assert_eq!(lines.iter().filter(|l| l.contains("ext-bot")).count(), 1);
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_render_summary_excluding_custom_overseer() {
        let mut registry = AgentRegistry::new();
        registry.register(builtin("observer", "watches"));
        registry.register(builtin("moderator", "triages"));

        let table = registry.render_summary_excluding("moderator");
        assert!(!table.contains("moderator"));
        assert!(table.contains("| observer | watches | auto-decide |"));
    }

    #[test]
    fn test_equality_by_value() {
        let build = || {
            let mut registry = AgentRegistry::new();
            registry.register(builtin("moderator", "runs things"));
            registry
        };
        assert_eq!(build(), build());

        let mut other = build();
        other.register(builtin("summarizer", ""));
        assert_ne!(build(), other);
    }
}
