//! Agent definitions and the registry that resolves them.
//!
//! - [`entities::AgentDefinition`]: one agent's identity and instructions
//! - [`registry::AgentRegistry`]: id → definition lookup, aliases, summary table

pub mod entities;
pub mod registry;

/// Id of the overseer role, which decides whether another agent should run.
pub const OVERSEER_AGENT_ID: &str = "observer";

/// Id of the agent that ranks candidate items.
pub const RANKER_AGENT_ID: &str = "ranker";

/// Normalize an agent id for registry keys and lookups.
pub fn normalize_agent_id(id: &str) -> String {
    id.trim().to_lowercase()
}
